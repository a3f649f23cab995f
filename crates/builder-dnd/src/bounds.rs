//! Canvas geometry: bounding boxes and the id -> bounds layout map.

use std::collections::HashMap;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use builder_core::ComponentId;
use builder_tree::DesignTree;

/// Width of the edge band that turns a container hover into a sibling hover.
pub const EDGE_BAND: f64 = 8.0;

/// Axis-aligned bounding box in canvas coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn position(&self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }

    pub fn size(&self) -> DVec2 {
        DVec2::new(self.width, self.height)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> DVec2 {
        self.position() + self.size() / 2.0
    }

    /// Check if a point is inside the bounds (edges inclusive).
    pub fn contains(&self, point: DVec2) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }

    /// Leading edge along an axis.
    pub fn start(&self, horizontal: bool) -> f64 {
        if horizontal {
            self.x
        } else {
            self.y
        }
    }

    /// Extent along an axis.
    pub fn extent(&self, horizontal: bool) -> f64 {
        if horizontal {
            self.width
        } else {
            self.height
        }
    }

    /// Thickness of the reorder band: [`EDGE_BAND`], at most a quarter of the extent.
    pub fn edge_band(&self, horizontal: bool) -> f64 {
        EDGE_BAND.min(self.extent(horizontal) / 4.0)
    }

    /// Compute intersection with another bounds.
    pub fn intersect(&self, other: &Bounds) -> Option<Bounds> {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = self.right().min(other.right());
        let y2 = self.bottom().min(other.bottom());
        (x1 < x2 && y1 < y2).then(|| Bounds::new(x1, y1, x2 - x1, y2 - y1))
    }
}

/// Coordinate along an axis.
pub fn along(point: DVec2, horizontal: bool) -> f64 {
    if horizontal {
        point.x
    } else {
        point.y
    }
}

/// Absolute bounds of rendered nodes, supplied by the presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanvasLayout {
    bounds: HashMap<ComponentId, Bounds>,
}

impl CanvasLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<ComponentId>, bounds: Bounds) {
        self.bounds.insert(id.into(), bounds);
    }

    pub fn with(mut self, id: impl Into<ComponentId>, bounds: Bounds) -> Self {
        self.insert(id, bounds);
        self
    }

    pub fn get(&self, id: impl AsRef<str>) -> Option<&Bounds> {
        self.bounds.get(id.as_ref())
    }

    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    /// Find the deepest node under `point`, testing later children first.
    /// The subtree rooted at `exclude` is invisible to the test.
    pub fn hit_test(
        &self,
        tree: &DesignTree,
        point: DVec2,
        exclude: Option<&ComponentId>,
    ) -> Option<ComponentId> {
        let root = tree.root()?;
        self.hit_test_recursive(tree, root, point, exclude)
    }

    fn hit_test_recursive(
        &self,
        tree: &DesignTree,
        id: &ComponentId,
        point: DVec2,
        exclude: Option<&ComponentId>,
    ) -> Option<ComponentId> {
        if exclude == Some(id) {
            return None;
        }
        if !self.get(id)?.contains(point) {
            return None;
        }
        for child in tree.children(id).iter().rev() {
            if let Some(hit) = self.hit_test_recursive(tree, child, point, exclude) {
                return Some(hit);
            }
        }
        Some(id.clone())
    }
}

impl FromIterator<(ComponentId, Bounds)> for CanvasLayout {
    fn from_iter<T: IntoIterator<Item = (ComponentId, Bounds)>>(iter: T) -> Self {
        Self {
            bounds: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use builder_core::ComponentType;

    #[test]
    fn test_bounds_contains() {
        let b = Bounds::new(10.0, 10.0, 100.0, 50.0);
        assert!(b.contains(DVec2::new(50.0, 30.0)));
        assert!(b.contains(DVec2::new(10.0, 10.0)));
        assert!(!b.contains(DVec2::new(5.0, 30.0)));
        assert_eq!(b.center(), DVec2::new(60.0, 35.0));
    }

    #[test]
    fn test_edge_band_capped() {
        assert_eq!(Bounds::new(0.0, 0.0, 100.0, 100.0).edge_band(false), 8.0);
        assert_eq!(Bounds::new(0.0, 0.0, 100.0, 20.0).edge_band(false), 5.0);
        assert_eq!(Bounds::new(0.0, 0.0, 20.0, 100.0).edge_band(true), 5.0);
    }

    #[test]
    fn test_intersect() {
        let a = Bounds::new(0.0, 0.0, 100.0, 100.0);
        let b = Bounds::new(50.0, 50.0, 100.0, 100.0);
        assert_eq!(a.intersect(&b), Some(Bounds::new(50.0, 50.0, 50.0, 50.0)));
        assert_eq!(a.intersect(&Bounds::new(200.0, 0.0, 10.0, 10.0)), None);
    }

    #[test]
    fn test_hit_test_deepest() {
        let mut tree = DesignTree::with_scaffold();
        let column = tree.add(ComponentType::Column, "content", None).unwrap();
        let text = tree.add(ComponentType::Text, &column, None).unwrap();

        let layout = CanvasLayout::new()
            .with("root", Bounds::new(0.0, 0.0, 400.0, 800.0))
            .with("content", Bounds::new(0.0, 64.0, 400.0, 672.0))
            .with(column.clone(), Bounds::new(0.0, 64.0, 400.0, 200.0))
            .with(text.clone(), Bounds::new(0.0, 64.0, 400.0, 40.0));

        assert_eq!(layout.hit_test(&tree, DVec2::new(10.0, 70.0), None), Some(text.clone()));
        assert_eq!(layout.hit_test(&tree, DVec2::new(10.0, 150.0), None), Some(column.clone()));
        assert_eq!(
            layout.hit_test(&tree, DVec2::new(10.0, 70.0), Some(&column)),
            Some(ComponentId::from("content"))
        );
        assert_eq!(layout.hit_test(&tree, DVec2::new(500.0, 70.0), None), None);
    }
}
