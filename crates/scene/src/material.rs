//! Renderable material descriptors expanded from the byte columns.

use std::sync::Arc;

use bos_tables::MaterialTable;
use glam::Vec4;

/// Opacity at or above this renders as opaque.
pub const TRANSPARENCY_THRESHOLD: f32 = 0.999;

/// Flat-shaded PBR descriptor for the shading collaborator.
///
/// Materials are handed out as `Arc`s by [`MaterialCache`], one per
/// material id; override/reset logic compares identity (`Arc::ptr_eq`),
/// never values.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Material {
    /// rgba, channels normalized to 0..=1.
    pub color: Vec4,
    pub roughness: f32,
    pub metallic: f32,
    pub transparent: bool,
}

impl Material {
    pub fn opacity(&self) -> f32 {
        self.color.w
    }
}

/// Memoizing material builder; one `Arc<Material>` per material id.
pub struct MaterialCache<'a> {
    table: &'a MaterialTable,
    cache: Vec<Option<Arc<Material>>>,
}

impl<'a> MaterialCache<'a> {
    pub fn new(table: &'a MaterialTable) -> Self {
        Self {
            table,
            cache: vec![None; table.len()],
        }
    }

    /// Returns the memoized material for `id`, building it on first use.
    ///
    /// Callers guarantee `id` is in range (the bucketer has already
    /// skipped out-of-range material indices).
    pub fn get(&mut self, id: usize) -> Arc<Material> {
        if let Some(material) = &self.cache[id] {
            return material.clone();
        }

        let byte = |column: &[u8], fallback: u8| {
            column.get(id).copied().unwrap_or(fallback) as f32 / 255.0
        };

        let alpha = byte(&self.table.alpha, 255);
        let material = Arc::new(Material {
            color: Vec4::new(
                byte(&self.table.red, 255),
                byte(&self.table.green, 255),
                byte(&self.table.blue, 255),
                alpha,
            ),
            roughness: byte(&self.table.roughness, 128),
            metallic: byte(&self.table.metallic, 0),
            transparent: alpha < TRANSPARENCY_THRESHOLD,
        });

        self.cache[id] = Some(material.clone());
        material
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> MaterialTable {
        MaterialTable {
            red: vec![255, 51],
            green: vec![255, 51],
            blue: vec![255, 51],
            alpha: vec![255, 127],
            roughness: vec![128, 0],
            metallic: vec![0, 255],
        }
    }

    #[test]
    fn expands_byte_channels() {
        let table = table();
        let mut cache = MaterialCache::new(&table);
        let material = cache.get(1);

        assert!((material.color.x - 0.2).abs() < 1e-3);
        assert!((material.opacity() - 127.0 / 255.0).abs() < 1e-6);
        assert!(material.transparent);
        assert_eq!(material.metallic, 1.0);
    }

    #[test]
    fn opaque_below_threshold_only() {
        let table = table();
        let mut cache = MaterialCache::new(&table);
        assert!(!cache.get(0).transparent);
    }

    #[test]
    fn memoizes_by_identity() {
        let table = table();
        let mut cache = MaterialCache::new(&table);
        let a = cache.get(0);
        let b = cache.get(0);
        let other = cache.get(1);

        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &other));
    }
}
