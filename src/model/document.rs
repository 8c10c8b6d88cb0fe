use std::fs;
use std::path::Path;

use anyhow::Context as _;
use log::info;
use serde::Deserialize;

/// On-disk letter model: shared vertex/normal pools plus one polygonal
/// object per letter, in H, O, N order.
#[derive(Debug, Deserialize)]
pub struct ModelDocument {
    pub vertices: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub objects: Vec<SourceObject>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceObject {
    #[serde(default)]
    pub name: Option<String>,
    pub faces: Vec<Face>,
}

/// A triangle or quad referencing the shared pools. Index values may be
/// out of range; the slicer substitutes defaults rather than rejecting
/// the document.
#[derive(Debug, Clone, Deserialize)]
pub struct Face {
    pub vertices: Vec<i64>,
    #[serde(default)]
    pub normals: Vec<i64>,
}

impl ModelDocument {
    /// Reads and parses a model file. Any I/O or parse error aborts letter
    /// setup; there is no retry and no partial success.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read model file {}", path.display()))?;
        let document: ModelDocument = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse model file {}", path.display()))?;

        info!(
            "loaded model {}: {} vertices, {} normals, {} objects",
            path.display(),
            document.vertices.len(),
            document.normals.len(),
            document.objects.len()
        );

        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_triangles_and_quads() {
        let document: ModelDocument = serde_json::from_str(
            r#"{
                "vertices": [[0,0,0],[1,0,0],[1,1,0],[0,1,0]],
                "normals": [[0,0,1]],
                "objects": [
                    {"name": "H", "faces": [
                        {"vertices": [0,1,2], "normals": [0,0,0]},
                        {"vertices": [0,1,2,3], "normals": [0,0,0,0]}
                    ]}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(document.vertices.len(), 4);
        assert_eq!(document.objects.len(), 1);
        assert_eq!(document.objects[0].name.as_deref(), Some("H"));
        assert_eq!(document.objects[0].faces[0].vertices.len(), 3);
        assert_eq!(document.objects[0].faces[1].vertices.len(), 4);
    }

    #[test]
    fn face_normals_default_to_empty() {
        let document: ModelDocument = serde_json::from_str(
            r#"{
                "vertices": [[0,0,0]],
                "normals": [],
                "objects": [{"faces": [{"vertices": [0,0,0]}]}]
            }"#,
        )
        .unwrap();

        assert!(document.objects[0].faces[0].normals.is_empty());
    }

    #[test]
    fn out_of_range_indices_are_representable() {
        let document: ModelDocument = serde_json::from_str(
            r#"{
                "vertices": [[0,0,0]],
                "normals": [[0,0,1]],
                "objects": [{"faces": [{"vertices": [-1,99,0], "normals": [0,0,0]}]}]
            }"#,
        )
        .unwrap();

        assert_eq!(document.objects[0].faces[0].vertices, vec![-1, 99, 0]);
    }

    #[test]
    fn load_reports_missing_file() {
        let err = ModelDocument::load(Path::new("does/not/exist.json")).unwrap_err();
        assert!(format!("{err:#}").contains("does/not/exist.json"));
    }
}
