use glam::Vec3;
use log::warn;

use crate::model::document::{Face, ModelDocument};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Letter {
    H,
    O,
    N,
}

impl Letter {
    pub const ALL: [Letter; 3] = [Letter::H, Letter::O, Letter::N];

    pub fn index(self) -> usize {
        match self {
            Letter::H => 0,
            Letter::O => 1,
            Letter::N => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Letter::H => "H",
            Letter::O => "O",
            Letter::N => "N",
        }
    }
}

/// A contiguous run of faces taken from one source object.
#[derive(Debug)]
struct FaceSegment {
    object: usize,
    start: usize,
    /// `None` runs to the end of the source object's face list.
    end: Option<usize>,
    /// Normal substituted when a face's normal index misses the pool.
    /// The H donor segment uses (0,1,0) while every other path uses
    /// (0,0,1); the mismatch is kept deliberately.
    normal_fallback: [f32; 3],
}

// Face ownership is fixed at build time and disjoint across letters:
// H owns all of object 0 plus the first 6 faces of object 1, O owns the
// rest of object 1 plus the first 18 faces of object 2, N owns what
// remains of object 2.
const H_SEGMENTS: [FaceSegment; 2] = [
    FaceSegment {
        object: 0,
        start: 0,
        end: None,
        normal_fallback: [0.0, 0.0, 1.0],
    },
    FaceSegment {
        object: 1,
        start: 0,
        end: Some(6),
        normal_fallback: [0.0, 1.0, 0.0],
    },
];

const O_SEGMENTS: [FaceSegment; 2] = [
    FaceSegment {
        object: 1,
        start: 6,
        end: None,
        normal_fallback: [0.0, 0.0, 1.0],
    },
    FaceSegment {
        object: 2,
        start: 0,
        end: Some(18),
        normal_fallback: [0.0, 0.0, 1.0],
    },
];

const N_SEGMENTS: [FaceSegment; 1] = [FaceSegment {
    object: 2,
    start: 18,
    end: None,
    normal_fallback: [0.0, 0.0, 1.0],
}];

fn segments(letter: Letter) -> &'static [FaceSegment] {
    match letter {
        Letter::H => &H_SEGMENTS,
        Letter::O => &O_SEGMENTS,
        Letter::N => &N_SEGMENTS,
    }
}

/// Flat triangle-list geometry for one letter, in face-then-vertex order.
/// Draw calls rely on this ordering: contiguous triangles from offset 0,
/// no index buffer.
pub struct LetterGeometry {
    pub letter: Letter,
    pub vertices: Vec<f32>,
    pub normals: Vec<f32>,
}

impl LetterGeometry {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }

    /// Component-wise mean of all vertex positions; the letter's rotation
    /// pivot. Zero for empty geometry.
    pub fn centroid(&self) -> Vec3 {
        let count = self.vertex_count();
        if count == 0 {
            return Vec3::ZERO;
        }

        let mut sum = Vec3::ZERO;
        for chunk in self.vertices.chunks_exact(3) {
            sum += Vec3::new(chunk[0], chunk[1], chunk[2]);
        }
        sum / count as f32
    }
}

/// Slices the document into per-letter geometry. Letters that end up
/// empty (missing source objects or no usable faces) are excluded from
/// the result and never drawn.
pub fn slice_letters(document: &ModelDocument) -> Vec<LetterGeometry> {
    let mut letters = Vec::new();
    for letter in Letter::ALL {
        match slice_letter(document, letter) {
            Some(geometry) => letters.push(geometry),
            None => warn!("letter {} has no geometry and will not be drawn", letter.name()),
        }
    }
    letters
}

pub fn slice_letter(document: &ModelDocument, letter: Letter) -> Option<LetterGeometry> {
    let segments = segments(letter);

    let required = segments.iter().map(|s| s.object + 1).max().unwrap_or(0);
    if document.objects.len() < required {
        return None;
    }

    let mut geometry = LetterGeometry {
        letter,
        vertices: Vec::new(),
        normals: Vec::new(),
    };

    for segment in segments {
        let faces = &document.objects[segment.object].faces;
        let end = segment.end.unwrap_or(faces.len()).min(faces.len());
        let start = segment.start.min(end);

        for face in &faces[start..end] {
            emit_face(document, letter, segment, face, &mut geometry);
        }
    }

    if geometry.vertices.is_empty() {
        None
    } else {
        Some(geometry)
    }
}

// Quads split along the 0-2 diagonal.
const QUAD_FAN: [usize; 6] = [0, 1, 2, 0, 2, 3];

fn emit_face(
    document: &ModelDocument,
    letter: Letter,
    segment: &FaceSegment,
    face: &Face,
    out: &mut LetterGeometry,
) {
    match face.vertices.len() {
        3 => {
            for corner in 0..3 {
                emit_corner(document, letter, segment, face, corner, out);
            }
        }
        4 => {
            for &corner in &QUAD_FAN {
                emit_corner(document, letter, segment, face, corner, out);
            }
        }
        arity => {
            warn!("letter {}: skipping face with {arity} vertices", letter.name());
        }
    }
}

fn emit_corner(
    document: &ModelDocument,
    letter: Letter,
    segment: &FaceSegment,
    face: &Face,
    corner: usize,
    out: &mut LetterGeometry,
) {
    let vertex_index = face.vertices[corner];
    // A face without a normal entry for this corner falls back to index 0.
    let normal_index = face.normals.get(corner).copied().unwrap_or(0);

    let position = resolve(&document.vertices, vertex_index, [0.0, 0.0, 0.0]);
    if position.substituted {
        warn!(
            "letter {}: vertex index {vertex_index} out of range, substituting origin",
            letter.name()
        );
    }
    out.vertices.extend_from_slice(&position.value);

    let normal = resolve(&document.normals, normal_index, segment.normal_fallback);
    if normal.substituted {
        warn!(
            "letter {}: normal index {normal_index} out of range, substituting {:?}",
            letter.name(),
            segment.normal_fallback
        );
    }
    out.normals.extend_from_slice(&normal.value);
}

struct Resolved {
    value: [f32; 3],
    substituted: bool,
}

/// Looks up a pooled triple, substituting `fallback` when the index is
/// negative or past the end of the pool.
fn resolve(pool: &[[f32; 3]], index: i64, fallback: [f32; 3]) -> Resolved {
    match usize::try_from(index).ok().and_then(|i| pool.get(i)) {
        Some(value) => Resolved {
            value: *value,
            substituted: false,
        },
        None => Resolved {
            value: fallback,
            substituted: true,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::document::SourceObject;

    fn tri(vertices: [i64; 3]) -> Face {
        Face {
            vertices: vertices.to_vec(),
            normals: vec![0, 0, 0],
        }
    }

    fn quad(vertices: [i64; 4]) -> Face {
        Face {
            vertices: vertices.to_vec(),
            normals: vec![0, 0, 0, 0],
        }
    }

    fn object(faces: Vec<Face>) -> SourceObject {
        SourceObject { name: None, faces }
    }

    fn document(objects: Vec<SourceObject>) -> ModelDocument {
        ModelDocument {
            vertices: vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [2.0, 0.0, 0.0],
                [3.0, 0.0, 0.0],
                [4.0, 0.0, 0.0],
                [5.0, 0.0, 0.0],
            ],
            normals: vec![[0.0, 0.0, 1.0], [1.0, 0.0, 0.0]],
            objects,
        }
    }

    fn positions(geometry: &LetterGeometry) -> Vec<[f32; 3]> {
        geometry
            .vertices
            .chunks_exact(3)
            .map(|c| [c[0], c[1], c[2]])
            .collect()
    }

    #[test]
    fn triangle_emits_three_vertices_in_order() {
        let doc = document(vec![
            object(vec![tri([1, 2, 3])]),
            object(vec![]),
            object(vec![]),
        ]);

        let h = slice_letter(&doc, Letter::H).unwrap();
        assert_eq!(h.vertex_count(), 3);
        assert_eq!(
            positions(&h),
            vec![[1.0, 0.0, 0.0], [2.0, 0.0, 0.0], [3.0, 0.0, 0.0]]
        );
    }

    #[test]
    fn quad_fans_into_two_triangles() {
        let doc = document(vec![
            object(vec![quad([0, 1, 2, 3])]),
            object(vec![]),
            object(vec![]),
        ]);

        let h = slice_letter(&doc, Letter::H).unwrap();
        assert_eq!(h.vertex_count(), 6);
        // (0,1,2) then (0,2,3)
        assert_eq!(
            positions(&h),
            vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [2.0, 0.0, 0.0],
                [0.0, 0.0, 0.0],
                [2.0, 0.0, 0.0],
                [3.0, 0.0, 0.0],
            ]
        );
    }

    #[test]
    fn unsupported_arity_is_skipped() {
        let doc = document(vec![
            object(vec![
                Face {
                    vertices: vec![0, 1, 2, 3, 4],
                    normals: vec![0, 0, 0, 0, 0],
                },
                tri([0, 1, 2]),
            ]),
            object(vec![]),
            object(vec![]),
        ]);

        let h = slice_letter(&doc, Letter::H).unwrap();
        assert_eq!(h.vertex_count(), 3);
    }

    #[test]
    fn out_of_range_vertex_substitutes_origin() {
        let doc = document(vec![
            object(vec![tri([99, -1, 1])]),
            object(vec![]),
            object(vec![]),
        ]);

        let h = slice_letter(&doc, Letter::H).unwrap();
        assert_eq!(
            positions(&h),
            vec![[0.0, 0.0, 0.0], [0.0, 0.0, 0.0], [1.0, 0.0, 0.0]]
        );
    }

    #[test]
    fn out_of_range_normal_uses_path_specific_fallback() {
        let bad_normals = Face {
            vertices: vec![0, 1, 2],
            normals: vec![9, 9, 9],
        };
        // Same malformed face in H's own object and in O's donor range.
        let doc = document(vec![
            object(vec![bad_normals]),
            object(vec![Face {
                vertices: vec![0, 1, 2],
                normals: vec![9, 9, 9],
            }]),
            object(vec![]),
        ]);

        let h = slice_letter(&doc, Letter::H).unwrap();
        // Object 0 path falls back to +Z, the donor range from object 1
        // falls back to +Y.
        assert_eq!(&h.normals[0..3], &[0.0, 0.0, 1.0]);
        assert_eq!(&h.normals[9..12], &[0.0, 1.0, 0.0]);
    }

    #[test]
    fn o_and_n_fall_back_to_plus_z() {
        let mut o_faces = vec![tri([0, 1, 2]); 6];
        o_faces.push(Face {
            vertices: vec![0, 1, 2],
            normals: vec![9, 9, 9],
        });
        let mut n_faces = vec![tri([0, 1, 2]); 18];
        n_faces.push(Face {
            vertices: vec![0, 1, 2],
            normals: vec![9, 9, 9],
        });

        let doc = document(vec![object(vec![]), object(o_faces), object(n_faces)]);

        let o = slice_letter(&doc, Letter::O).unwrap();
        assert_eq!(&o.normals[0..3], &[0.0, 0.0, 1.0]);

        let n = slice_letter(&doc, Letter::N).unwrap();
        assert_eq!(&n.normals[0..3], &[0.0, 0.0, 1.0]);
    }

    #[test]
    fn missing_normal_entries_resolve_to_index_zero() {
        let doc = document(vec![
            object(vec![Face {
                vertices: vec![0, 1, 2],
                normals: vec![],
            }]),
            object(vec![]),
            object(vec![]),
        ]);

        let h = slice_letter(&doc, Letter::H).unwrap();
        assert_eq!(&h.normals[0..3], &[0.0, 0.0, 1.0]);
    }

    #[test]
    fn assignment_ranges_are_disjoint_and_exact() {
        // Distinguish faces by their first vertex index.
        let o_faces: Vec<Face> = (0..8).map(|i| tri([i % 6, 0, 0])).collect();
        let n_faces: Vec<Face> = (0..20).map(|i| tri([i % 6, 0, 0])).collect();
        let doc = document(vec![
            object(vec![tri([5, 5, 5])]),
            object(o_faces),
            object(n_faces),
        ]);

        let h = slice_letter(&doc, Letter::H).unwrap();
        let o = slice_letter(&doc, Letter::O).unwrap();
        let n = slice_letter(&doc, Letter::N).unwrap();

        // H = its own face + object 1 faces [0,6)
        assert_eq!(h.vertex_count(), 3 + 6 * 3);
        // O = object 1 faces [6,8) + object 2 faces [0,18)
        assert_eq!(o.vertex_count(), 2 * 3 + 18 * 3);
        // N = object 2 faces [18,20)
        assert_eq!(n.vertex_count(), 2 * 3);

        // O's first face is object 1 face 6 (first vertex index 0 after
        // wrapping 6 % 6), N's first face is object 2 face 18.
        assert_eq!(positions(&o)[0], [0.0, 0.0, 0.0]);
        assert_eq!(positions(&n)[0], [0.0, 0.0, 0.0]);
    }

    #[test]
    fn vertex_counts_for_mixed_arity_fixture() {
        // object 0: 2 triangles, object 1: 8 quads, object 2: 20 triangles.
        let doc = document(vec![
            object((0..2).map(|_| tri([0, 1, 2])).collect()),
            object((0..8).map(|_| quad([0, 1, 2, 3])).collect()),
            object((0..20).map(|_| tri([0, 1, 2])).collect()),
        ]);

        let h = slice_letter(&doc, Letter::H).unwrap();
        let o = slice_letter(&doc, Letter::O).unwrap();
        let n = slice_letter(&doc, Letter::N).unwrap();

        // H: 2 own triangles + 6 donated quads, each quad 6 vertices.
        assert_eq!(h.vertex_count(), 2 * 3 + 6 * 6);
        // O: 2 remaining quads + 18 donated triangles.
        assert_eq!(o.vertex_count(), 2 * 6 + 18 * 3);
        // N: 2 remaining triangles.
        assert_eq!(n.vertex_count(), 2 * 3);
    }

    #[test]
    fn donor_ranges_clamp_to_available_faces() {
        // Object 1 has fewer than 6 faces: H takes what exists, O gets none
        // of object 1.
        let doc = document(vec![
            object(vec![tri([0, 1, 2])]),
            object(vec![tri([0, 1, 2]); 4]),
            object(vec![tri([0, 1, 2]); 2]),
        ]);

        let h = slice_letter(&doc, Letter::H).unwrap();
        assert_eq!(h.vertex_count(), 3 + 4 * 3);

        let o = slice_letter(&doc, Letter::O).unwrap();
        // Only object 2's first faces remain for O.
        assert_eq!(o.vertex_count(), 2 * 3);
    }

    #[test]
    fn centroid_is_component_wise_mean() {
        let mut doc = document(vec![object(vec![tri([0, 1, 2])]), object(vec![]), object(vec![])]);
        doc.vertices = vec![[0.0, 0.0, 0.0], [3.0, 3.0, 0.0], [6.0, 0.0, 3.0]];

        let h = slice_letter(&doc, Letter::H).unwrap();
        let centroid = h.centroid();
        assert!((centroid.x - 3.0).abs() < 1e-6);
        assert!((centroid.y - 1.0).abs() < 1e-6);
        assert!((centroid.z - 1.0).abs() < 1e-6);
    }

    #[test]
    fn missing_objects_disable_dependent_letters() {
        let doc = document(vec![object(vec![tri([0, 1, 2])]), object(vec![tri([0, 1, 2])])]);

        assert!(slice_letter(&doc, Letter::H).is_some());
        assert!(slice_letter(&doc, Letter::O).is_none());
        assert!(slice_letter(&doc, Letter::N).is_none());
    }

    #[test]
    fn empty_letters_are_excluded_from_the_draw_list() {
        // Object 2 has exactly 18 faces, so N is left with nothing.
        let doc = document(vec![
            object(vec![tri([0, 1, 2])]),
            object(vec![tri([0, 1, 2]); 7]),
            object(vec![tri([0, 1, 2]); 18]),
        ]);

        let letters = slice_letters(&doc);
        let names: Vec<&str> = letters.iter().map(|g| g.letter.name()).collect();
        assert_eq!(names, vec!["H", "O"]);
    }
}
