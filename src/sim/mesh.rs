//! Procedural polyhedral meshes
//!
//! Meshes are immutable templates shared (via `Rc`) by every entity that
//! uses them. Entities keep their own transformed copy of the vertices.

use glam::Vec3;

/// A polygon referencing mesh vertices by index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Face {
    Tri([usize; 3]),
    Quad([usize; 4]),
}

impl Face {
    #[inline]
    pub fn indices(&self) -> &[usize] {
        match self {
            Face::Tri(i) => i,
            Face::Quad(i) => i,
        }
    }

    /// Same face with every index shifted by `offset`
    pub fn offset(&self, offset: usize) -> Face {
        self.map(|i| i + offset)
    }

    fn map(&self, f: impl Fn(usize) -> usize) -> Face {
        match *self {
            Face::Tri([a, b, c]) => Face::Tri([f(a), f(b), f(c)]),
            Face::Quad([a, b, c, d]) => Face::Quad([f(a), f(b), f(c), f(d)]),
        }
    }

    fn index_sum(&self) -> usize {
        self.indices().iter().sum()
    }

    /// Same vertex set, ignoring winding and starting vertex
    fn same_vertices(&self, other: &Face) -> bool {
        let a = self.indices();
        let b = other.indices();
        a.len() == b.len() && a.iter().all(|i| b.contains(i)) && b.iter().all(|i| a.contains(i))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vec3>,
    pub faces: Vec<Face>,
}

impl Mesh {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }
}

/// Axis-aligned cube spanning `[-scale, scale]` on each axis
///
/// Faces wind so `face_normal` points outward.
pub fn build_cube(scale: f32) -> Mesh {
    let vertices = [
        // front (z = +1)
        Vec3::new(-1.0, -1.0, 1.0),
        Vec3::new(1.0, -1.0, 1.0),
        Vec3::new(1.0, 1.0, 1.0),
        Vec3::new(-1.0, 1.0, 1.0),
        // back (z = -1)
        Vec3::new(-1.0, -1.0, -1.0),
        Vec3::new(1.0, -1.0, -1.0),
        Vec3::new(1.0, 1.0, -1.0),
        Vec3::new(-1.0, 1.0, -1.0),
    ]
    .into_iter()
    .map(|v| v * scale)
    .collect();

    let faces = vec![
        Face::Quad([0, 1, 2, 3]),
        Face::Quad([7, 6, 5, 4]),
        Face::Quad([3, 2, 6, 7]),
        Face::Quad([4, 5, 1, 0]),
        Face::Quad([5, 6, 2, 1]),
        Face::Quad([0, 3, 7, 4]),
    ];

    Mesh { vertices, faces }
}

/// Child origins of a Menger sponge cell: every offset in `{-s, 0, +s}^3`
/// with at most one zero component (20 of the 27 sub-cells)
pub fn menger_sponge_split(origin: Vec3, step: f32) -> Vec<Vec3> {
    let axis = [-step, 0.0, step];
    let mut children = Vec::with_capacity(20);
    for x in axis {
        for y in axis {
            for z in axis {
                let zeros = [x, y, z].iter().filter(|c| **c == 0.0).count();
                if zeros <= 1 {
                    children.push(origin + Vec3::new(x, y, z));
                }
            }
        }
    }
    children
}

/// Recursively subdivided cube
///
/// Starting from a single origin, every level replaces each origin with the
/// children produced by `split(origin, step)` where `step = 2 / 3^level`.
/// A cube scaled by `1 / 3^levels` is then instanced at every final origin.
/// The result is unwelded; run it through [`weld_mesh`] before use.
pub fn build_fractal_cube<F>(levels: u32, split: F, scale: f32) -> Mesh
where
    F: Fn(Vec3, f32) -> Vec<Vec3>,
{
    let level_scale = |level: u32| 1.0 / 3f32.powi(level as i32);

    let mut origins = vec![Vec3::ZERO];
    for level in 1..=levels {
        let step = level_scale(level) * 2.0;
        origins = origins.into_iter().flat_map(|o| split(o, step)).collect();
    }

    let cell = build_cube(level_scale(levels));
    let mut mesh = Mesh {
        vertices: Vec::with_capacity(origins.len() * cell.vertices.len()),
        faces: Vec::with_capacity(origins.len() * cell.faces.len()),
    };
    for origin in origins {
        let base = mesh.vertices.len();
        mesh.vertices
            .extend(cell.vertices.iter().map(|v| (*v + origin) * scale));
        mesh.faces.extend(cell.faces.iter().map(|f| f.offset(base)));
    }
    mesh
}

/// Merge coincident vertices and drop interior faces
///
/// Vertices within `epsilon` on all three axes of an earlier kept vertex are
/// merged into it. Faces that share their vertex set with another face are
/// removed in pairs (both copies), which strips the walls between touching
/// cells.
pub fn weld_mesh(mesh: &Mesh, epsilon: f32) -> Mesh {
    let mut vertices: Vec<Vec3> = Vec::with_capacity(mesh.vertices.len());
    let remap: Vec<usize> = mesh
        .vertices
        .iter()
        .map(|v| {
            match vertices
                .iter()
                .position(|kept| (*kept - *v).abs().max_element() <= epsilon)
            {
                Some(i) => i,
                None => {
                    vertices.push(*v);
                    vertices.len() - 1
                }
            }
        })
        .collect();

    let mut faces: Vec<Face> = mesh.faces.iter().map(|f| f.map(|i| remap[i])).collect();
    // Equal vertex sets have equal index sums, so candidates end up contiguous
    faces.sort_by_key(|f| std::cmp::Reverse(f.index_sum()));

    let mut removed = vec![false; faces.len()];
    for i in 0..faces.len() {
        if removed[i] {
            continue;
        }
        let sum = faces[i].index_sum();
        for j in (i + 1)..faces.len() {
            if faces[j].index_sum() != sum {
                break;
            }
            if !removed[j] && faces[i].same_vertices(&faces[j]) {
                removed[i] = true;
                removed[j] = true;
                break;
            }
        }
    }

    let faces = faces
        .into_iter()
        .zip(removed)
        .filter_map(|(f, gone)| (!gone).then_some(f))
        .collect();

    Mesh { vertices, faces }
}
