// Graph seed files: JSON, optionally gzip-compressed
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use learngraph_core::{Edge, Error, Node, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Full node and edge list of a graph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSeed {
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

/// Counts written by a seed import
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeedSummary {
    pub nodes: usize,
    pub edges: usize,
}

fn is_gzip(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "gz")
}

impl GraphSeed {
    /// Read a seed from `path`; files ending in `.gz` are decompressed
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;

        let reader: Box<dyn Read> = if is_gzip(path) {
            Box::new(GzDecoder::new(BufReader::new(file)))
        } else {
            Box::new(BufReader::new(file))
        };

        serde_json::from_reader(reader).map_err(|e| Error::Serialization(format!("{}: {}", path.display(), e)))
    }

    /// Write the seed to `path`, gzip-compressed when it ends in `.gz`
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_vec_pretty(self).map_err(|e| Error::Serialization(e.to_string()))?;

        let file = File::create(path)?;
        if is_gzip(path) {
            let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
            encoder.write_all(&json)?;
            encoder.finish()?.flush()?;
        } else {
            let mut writer = BufWriter::new(file);
            writer.write_all(&json)?;
            writer.flush()?;
        }
        Ok(())
    }

    pub fn summary(&self) -> SeedSummary {
        SeedSummary {
            nodes: self.nodes.len(),
            edges: self.edges.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use learngraph_core::NodeType;

    fn sample() -> GraphSeed {
        GraphSeed {
            nodes: vec![
                Node::new("a", "A", NodeType::Lecture, "en"),
                Node::new("b", "B", NodeType::Assignment, "en").with_parent("a"),
            ],
            edges: vec![Edge::new("a", "b")],
        }
    }

    #[test]
    fn test_gzip_seed_is_readable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.json.gz");
        sample().save(&path).unwrap();

        let raw = std::fs::read(&path).unwrap();
        assert_eq!(&raw[..2], &[0x1f_u8, 0x8b]);
        assert_eq!(GraphSeed::load(&path).unwrap(), sample());
    }

    #[test]
    fn test_plain_json_seed_without_edges() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.json");
        std::fs::write(
            &path,
            r#"{"nodes":[{"id":"x","name":"X","description":"","node_type":"example","locale":"fr","parent":null}]}"#,
        )
        .unwrap();

        let seed = GraphSeed::load(&path).unwrap();
        assert_eq!(seed.summary(), SeedSummary { nodes: 1, edges: 0 });
        assert_eq!(seed.nodes[0].node_type, NodeType::Example);
    }

    #[test]
    fn test_malformed_seed_is_a_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{\"nodes\": [").unwrap();
        assert!(matches!(GraphSeed::load(&path), Err(Error::Serialization(_))));
    }
}
