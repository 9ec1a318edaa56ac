//! Table geometry: playing surface, rails and the six pockets
//!
//! The playing surface is an axis-aligned rectangle in the table plane
//! (y grows upward). Rails are a band of `rail_thickness` just outside it.
//! Corner pockets sit on the rectangle's corners, side pockets on the
//! midpoints of the two long edges.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::tuning::Tuning;

/// One edge of the playing surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Edge {
    /// x = min
    Left,
    /// x = max
    Right,
    /// y = min
    Bottom,
    /// y = max
    Top,
}

impl Edge {
    pub const ALL: [Edge; 4] = [Edge::Left, Edge::Right, Edge::Bottom, Edge::Top];
}

/// Pocket placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PocketKind {
    Corner,
    Side,
}

/// A pocket and its concentric zones
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pocket {
    pub center: Vec2,
    pub kind: PocketKind,
    /// Drawn hole radius
    pub visual_radius: f32,
    /// Ball center inside this radius is pocketed
    pub capture_radius: f32,
    /// Ball center inside this radius is pulled toward the center
    pub attraction_radius: f32,
    /// Ball center inside this radius skips rail clamping on adjoining edges
    pub near_radius: f32,
    /// Rails this pocket cuts into
    pub edges: [Option<Edge>; 2],
}

impl Pocket {
    #[inline]
    pub fn distance_to(&self, p: Vec2) -> f32 {
        (p - self.center).length()
    }

    /// Whether a ball centered at `p` falls in
    #[inline]
    pub fn captures(&self, p: Vec2) -> bool {
        self.distance_to(p) < self.capture_radius
    }

    /// Whether a ball centered at `p` is inside the attraction zone (inclusive)
    #[inline]
    pub fn attracts(&self, p: Vec2) -> bool {
        self.distance_to(p) <= self.attraction_radius
    }

    #[inline]
    pub fn is_near(&self, p: Vec2) -> bool {
        self.distance_to(p) < self.near_radius
    }

    pub fn adjoins(&self, edge: Edge) -> bool {
        self.edges.contains(&Some(edge))
    }

    /// Whether `p` lies in this corner pocket's jam annulus
    pub fn in_jam_zone(&self, p: Vec2, ball_radius: f32, tuning: &Tuning) -> bool {
        if self.kind != PocketKind::Corner {
            return false;
        }
        let d = self.distance_to(p);
        let inner = self.capture_radius - tuning.jam_inner_margin;
        let outer = self.capture_radius + ball_radius + tuning.jam_outer_margin;
        d >= inner && d <= outer
    }
}

/// The table: playing surface, rails and pockets. Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    pub origin: Vec2,
    pub size: Vec2,
    pub rail_thickness: f32,
    pub ball_radius: f32,
    pockets: Vec<Pocket>,
}

impl Table {
    pub fn new(
        origin: Vec2,
        size: Vec2,
        rail_thickness: f32,
        pocket_radius: f32,
        ball_radius: f32,
        tuning: &Tuning,
    ) -> Self {
        let min = origin;
        let max = origin + size;
        let mid_x = origin.x + size.x / 2.0;

        let layout = [
            (Vec2::new(min.x, min.y), PocketKind::Corner, [Some(Edge::Left), Some(Edge::Bottom)]),
            (Vec2::new(max.x, min.y), PocketKind::Corner, [Some(Edge::Right), Some(Edge::Bottom)]),
            (Vec2::new(min.x, max.y), PocketKind::Corner, [Some(Edge::Left), Some(Edge::Top)]),
            (Vec2::new(max.x, max.y), PocketKind::Corner, [Some(Edge::Right), Some(Edge::Top)]),
            (Vec2::new(mid_x, min.y), PocketKind::Side, [Some(Edge::Bottom), None]),
            (Vec2::new(mid_x, max.y), PocketKind::Side, [Some(Edge::Top), None]),
        ];

        let pockets = layout
            .into_iter()
            .map(|(center, kind, edges)| Pocket {
                center,
                kind,
                visual_radius: pocket_radius,
                capture_radius: tuning.capture_radius,
                attraction_radius: tuning.capture_radius + ball_radius + tuning.attraction_margin,
                near_radius: pocket_radius + ball_radius + tuning.near_pocket_margin,
                edges,
            })
            .collect();

        Self {
            origin,
            size,
            rail_thickness,
            ball_radius,
            pockets,
        }
    }

    /// The 280x200 table used on the 320x240 panel
    pub fn standard(tuning: &Tuning) -> Self {
        Self::new(
            Vec2::new(TABLE_X, TABLE_Y),
            Vec2::new(TABLE_WIDTH, TABLE_HEIGHT),
            RAIL_THICKNESS,
            POCKET_RADIUS,
            BALL_RADIUS,
            tuning,
        )
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.origin.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.origin.x + self.size.x
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.origin.y
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.origin.y + self.size.y
    }

    /// Coordinate of an edge along its normal axis
    pub fn edge_coord(&self, edge: Edge) -> f32 {
        match edge {
            Edge::Left => self.left(),
            Edge::Right => self.right(),
            Edge::Bottom => self.bottom(),
            Edge::Top => self.top(),
        }
    }

    /// Whether `p` is on the playing surface
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.left() && p.x <= self.right() && p.y >= self.bottom() && p.y <= self.top()
    }

    pub fn pockets(&self) -> &[Pocket] {
        &self.pockets
    }

    pub fn corner_pockets(&self) -> impl Iterator<Item = &Pocket> {
        self.pockets.iter().filter(|p| p.kind == PocketKind::Corner)
    }

    /// Near any pocket (rail clamping is relaxed there)
    pub fn is_near_pocket(&self, p: Vec2) -> bool {
        self.pockets.iter().any(|pocket| pocket.is_near(p))
    }

    /// Near a pocket that cuts into `edge`
    pub fn is_near_pocket_on(&self, p: Vec2, edge: Edge) -> bool {
        self.pockets
            .iter()
            .any(|pocket| pocket.adjoins(edge) && pocket.is_near(p))
    }

    pub fn is_in_attraction_zone(&self, p: Vec2) -> bool {
        self.attracting_pocket(p).is_some()
    }

    /// Nearest pocket whose attraction zone contains `p`
    pub fn attracting_pocket(&self, p: Vec2) -> Option<&Pocket> {
        self.pockets
            .iter()
            .filter(|pocket| pocket.attracts(p))
            .min_by(|a, b| {
                a.distance_to(p)
                    .partial_cmp(&b.distance_to(p))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    }

    /// Index of the pocket that captures a ball centered at `p`
    pub fn capturing_pocket(&self, p: Vec2) -> Option<usize> {
        self.pockets.iter().position(|pocket| pocket.captures(p))
    }

    pub fn is_captured(&self, p: Vec2) -> bool {
        self.capturing_pocket(p).is_some()
    }

    /// Nearest pocket regardless of zones
    pub fn nearest_pocket(&self, p: Vec2) -> &Pocket {
        // Six pockets always exist, so the fold starts from the first one
        let first = &self.pockets[0];
        self.pockets.iter().fold(first, |best, pocket| {
            if pocket.distance_to(p) < best.distance_to(p) {
                pocket
            } else {
                best
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Table {
        Table::standard(&Tuning::default())
    }

    #[test]
    fn test_six_pockets_four_corners() {
        let table = table();
        assert_eq!(table.pockets().len(), 6);
        assert_eq!(table.corner_pockets().count(), 4);
    }

    #[test]
    fn test_pocket_zone_radii() {
        let table = table();
        let tuning = Tuning::default();
        for pocket in table.pockets() {
            assert_eq!(pocket.capture_radius, tuning.capture_radius);
            assert_eq!(
                pocket.attraction_radius,
                tuning.capture_radius + BALL_RADIUS + tuning.attraction_margin
            );
            assert!(pocket.attraction_radius > pocket.capture_radius);
        }
    }

    #[test]
    fn test_center_of_pocket_is_captured() {
        let table = table();
        for (i, pocket) in table.pockets().iter().enumerate() {
            assert_eq!(table.capturing_pocket(pocket.center), Some(i));
        }
    }

    #[test]
    fn test_attraction_boundary_is_inclusive() {
        let table = table();
        let side = &table.pockets()[4];
        let p = side.center + Vec2::new(0.0, side.attraction_radius);
        assert!(table.is_in_attraction_zone(p));
        assert!(!table.is_in_attraction_zone(p + Vec2::new(0.0, 0.01)));
    }

    #[test]
    fn test_table_center_far_from_pockets() {
        let table = table();
        let center = table.origin + table.size / 2.0;
        assert!(table.contains(center));
        assert!(!table.is_near_pocket(center));
        assert!(!table.is_in_attraction_zone(center));
        assert!(!table.is_captured(center));
    }

    #[test]
    fn test_near_pocket_on_edge() {
        let table = table();
        // Hugging the bottom rail next to the bottom-left corner
        let p = Vec2::new(table.left() + 10.0, table.bottom() + 7.0);
        assert!(table.is_near_pocket_on(p, Edge::Bottom));
        assert!(table.is_near_pocket_on(p, Edge::Left));
        assert!(!table.is_near_pocket_on(p, Edge::Top));
        assert!(!table.is_near_pocket_on(p, Edge::Right));
    }

    #[test]
    fn test_jam_zone_only_on_corners() {
        let table = table();
        let tuning = Tuning::default();
        let corner = &table.pockets()[0];
        let side = &table.pockets()[4];
        let offset = Vec2::new(1.0, 1.0).normalize() * (tuning.capture_radius + 3.0);
        assert!(corner.in_jam_zone(corner.center + offset, BALL_RADIUS, &tuning));
        assert!(!side.in_jam_zone(side.center + Vec2::new(0.0, tuning.capture_radius + 3.0), BALL_RADIUS, &tuning));
    }

    #[test]
    fn test_nearest_pocket() {
        let table = table();
        let p = Vec2::new(table.right() - 5.0, table.top() - 5.0);
        assert_eq!(table.nearest_pocket(p).center, Vec2::new(table.right(), table.top()));
    }
}
