//! Map geometry primitives
//!
//! Closed set of geometry kinds that can be drawn on the map. All coordinates
//! are in projected map units (meters for the projections this crate targets),
//! so lengths and areas come out in meters and square meters.

use std::fmt;

/// Coordinate in projected map space
///
/// - X increases to the east
/// - Y increases to the north
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MapCoordinate {
    pub x: f64,
    pub y: f64,
}

impl MapCoordinate {
    /// Create a new map coordinate
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Calculate distance to another coordinate
    pub fn distance_to(&self, other: &MapCoordinate) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl From<[f64; 2]> for MapCoordinate {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned bounding box in map coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Extent {
    /// Bounding box of a coordinate sequence, `None` when empty
    pub fn of(coordinates: &[MapCoordinate]) -> Option<Self> {
        let first = coordinates.first()?;
        let mut extent = Extent {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
        };
        for point in coordinates.iter().skip(1) {
            extent.min_x = extent.min_x.min(point.x);
            extent.max_x = extent.max_x.max(point.x);
            extent.min_y = extent.min_y.min(point.y);
            extent.max_y = extent.max_y.max(point.y);
        }
        Some(extent)
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center_x(&self) -> f64 {
        (self.min_x + self.max_x) / 2.0
    }
}

/// Geometry kind discriminant, used for messages and logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    Point,
    LineString,
    Polygon,
    Circle,
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GeometryKind::Point => "point",
            GeometryKind::LineString => "line",
            GeometryKind::Polygon => "polygon",
            GeometryKind::Circle => "circle",
        };
        f.write_str(name)
    }
}

/// Geometry of a drawn feature
///
/// Polygon rings are stored open; ring 0 is the outer boundary and every
/// further ring is a hole. A ring that repeats its first vertex at the end
/// is tolerated everywhere a ring is read.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    /// Single position, used for text labels
    Point { position: MapCoordinate },

    /// Open path through its vertices
    LineString { coordinates: Vec<MapCoordinate> },

    /// Outer boundary plus holes
    Polygon { rings: Vec<Vec<MapCoordinate>> },

    /// Circle defined by center and radius (map units)
    Circle { center: MapCoordinate, radius: f64 },
}

/// Identifies a draggable vertex of a geometry in edit mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexHandle {
    /// Point position
    Position,
    /// Vertex `index` of ring `ring` (lines only have ring 0)
    Vertex { ring: usize, index: usize },
    /// Circle center: dragging translates the circle
    Center,
    /// Circle rim: dragging changes the radius
    Rim,
}

impl Geometry {
    /// Get the geometry kind
    pub fn kind(&self) -> GeometryKind {
        match self {
            Geometry::Point { .. } => GeometryKind::Point,
            Geometry::LineString { .. } => GeometryKind::LineString,
            Geometry::Polygon { .. } => GeometryKind::Polygon,
            Geometry::Circle { .. } => GeometryKind::Circle,
        }
    }

    /// Path length of a line string, `None` for other kinds
    pub fn length(&self) -> Option<f64> {
        match self {
            Geometry::LineString { coordinates } => Some(path_length(coordinates)),
            _ => None,
        }
    }

    /// Sum of every ring's closed length, `None` for non-polygons
    pub fn perimeter(&self) -> Option<f64> {
        match self {
            Geometry::Polygon { rings } => Some(rings.iter().map(|r| ring_length(r)).sum()),
            _ => None,
        }
    }

    /// Planar area (outer ring minus holes) for polygons, πr² for circles
    pub fn area(&self) -> Option<f64> {
        match self {
            Geometry::Polygon { rings } => {
                let mut rings = rings.iter();
                let outer = rings.next().map(|r| ring_area(r)).unwrap_or(0.0);
                let holes: f64 = rings.map(|r| ring_area(r)).sum();
                Some((outer - holes).max(0.0))
            }
            Geometry::Circle { radius, .. } => Some(std::f64::consts::PI * radius * radius),
            _ => None,
        }
    }

    /// Circle radius, `None` for other kinds
    pub fn radius(&self) -> Option<f64> {
        match self {
            Geometry::Circle { radius, .. } => Some(*radius),
            _ => None,
        }
    }

    /// Flat vertex sequence: the path of a line, the outer ring of a polygon
    pub fn coordinates(&self) -> &[MapCoordinate] {
        match self {
            Geometry::Point { position } => std::slice::from_ref(position),
            Geometry::LineString { coordinates } => coordinates,
            Geometry::Polygon { rings } => rings.first().map(Vec::as_slice).unwrap_or(&[]),
            Geometry::Circle { center, .. } => std::slice::from_ref(center),
        }
    }

    /// Get the bounding box for this geometry
    pub fn extent(&self) -> Option<Extent> {
        match self {
            Geometry::Point { position } => Extent::of(std::slice::from_ref(position)),
            Geometry::LineString { coordinates } => Extent::of(coordinates),
            Geometry::Polygon { rings } => Extent::of(rings.first()?),
            Geometry::Circle { center, radius } => Some(Extent {
                min_x: center.x - radius,
                min_y: center.y - radius,
                max_x: center.x + radius,
                max_y: center.y + radius,
            }),
        }
    }

    /// Check if a point hits this geometry (within tolerance)
    ///
    /// Filled shapes (polygons, circles) hit on their interior as well as
    /// their outline.
    pub fn hit_test(&self, point: &MapCoordinate, tolerance: f64) -> bool {
        match self {
            Geometry::Point { position } => position.distance_to(point) <= tolerance,
            Geometry::LineString { coordinates } => coordinates
                .windows(2)
                .any(|w| distance_to_segment(point, &w[0], &w[1]) <= tolerance),
            Geometry::Polygon { rings } => {
                let near_edge = rings.iter().any(|ring| {
                    ring_segments(ring).any(|(a, b)| distance_to_segment(point, a, b) <= tolerance)
                });
                if near_edge {
                    return true;
                }
                let mut rings = rings.iter();
                match rings.next() {
                    Some(outer) if ring_contains(outer, point) => {
                        !rings.any(|hole| ring_contains(hole, point))
                    }
                    _ => false,
                }
            }
            Geometry::Circle { center, radius } => center.distance_to(point) <= radius + tolerance,
        }
    }

    /// Find the draggable vertex nearest to `point` within tolerance
    pub fn vertex_at(&self, point: &MapCoordinate, tolerance: f64) -> Option<VertexHandle> {
        match self {
            Geometry::Point { position } => {
                (position.distance_to(point) <= tolerance).then_some(VertexHandle::Position)
            }
            Geometry::LineString { coordinates } => nearest_vertex(coordinates, point, tolerance)
                .map(|index| VertexHandle::Vertex { ring: 0, index }),
            Geometry::Polygon { rings } => {
                let mut best: Option<(f64, VertexHandle)> = None;
                for (ring, coordinates) in rings.iter().enumerate() {
                    if let Some(index) = nearest_vertex(coordinates, point, tolerance) {
                        let distance = coordinates[index].distance_to(point);
                        if best.map_or(true, |(d, _)| distance < d) {
                            best = Some((distance, VertexHandle::Vertex { ring, index }));
                        }
                    }
                }
                best.map(|(_, handle)| handle)
            }
            Geometry::Circle { center, radius } => {
                let distance = center.distance_to(point);
                if (distance - radius).abs() <= tolerance {
                    Some(VertexHandle::Rim)
                } else if distance <= tolerance {
                    Some(VertexHandle::Center)
                } else {
                    None
                }
            }
        }
    }

    /// Move the vertex identified by `handle` to `to`
    ///
    /// Returns false when the handle does not belong to this geometry.
    pub fn move_vertex(&mut self, handle: VertexHandle, to: MapCoordinate) -> bool {
        match (self, handle) {
            (Geometry::Point { position }, VertexHandle::Position) => {
                *position = to;
                true
            }
            (Geometry::LineString { coordinates }, VertexHandle::Vertex { ring: 0, index }) => {
                match coordinates.get_mut(index) {
                    Some(vertex) => {
                        *vertex = to;
                        true
                    }
                    None => false,
                }
            }
            (Geometry::Polygon { rings }, VertexHandle::Vertex { ring, index }) => {
                let Some(coordinates) = rings.get_mut(ring) else {
                    return false;
                };
                let closed = is_explicitly_closed(coordinates);
                let last = coordinates.len().saturating_sub(1);
                match coordinates.get_mut(index) {
                    Some(vertex) => *vertex = to,
                    None => return false,
                }
                // Keep an explicit closing vertex glued to the first one
                if closed && (index == 0 || index == last) {
                    let mirror = if index == 0 { last } else { 0 };
                    coordinates[mirror] = to;
                }
                true
            }
            (Geometry::Circle { center, .. }, VertexHandle::Center) => {
                *center = to;
                true
            }
            (Geometry::Circle { center, radius }, VertexHandle::Rim) => {
                *radius = center.distance_to(&to);
                true
            }
            _ => false,
        }
    }
}

/// Sum of consecutive-vertex distances along an open path
pub fn path_length(coordinates: &[MapCoordinate]) -> f64 {
    coordinates.windows(2).map(|w| w[0].distance_to(&w[1])).sum()
}

/// Length of a ring, implicitly closed back to its first vertex
pub fn ring_length(ring: &[MapCoordinate]) -> f64 {
    ring_segments(ring).map(|(a, b)| a.distance_to(b)).sum()
}

/// Unsigned shoelace area of a ring
pub fn ring_area(ring: &[MapCoordinate]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }
    let twice: f64 = ring_segments(ring).map(|(a, b)| a.x * b.y - b.x * a.y).sum();
    (twice / 2.0).abs()
}

fn is_explicitly_closed(ring: &[MapCoordinate]) -> bool {
    ring.len() > 1 && ring.first() == ring.last()
}

/// Segments of a ring including the closing segment
fn ring_segments(ring: &[MapCoordinate]) -> impl Iterator<Item = (&MapCoordinate, &MapCoordinate)> {
    let n = ring.len();
    let closing = if n > 1 { n } else { 0 };
    (0..closing).map(move |i| (&ring[i], &ring[(i + 1) % n]))
}

/// Even-odd point-in-ring test
fn ring_contains(ring: &[MapCoordinate], point: &MapCoordinate) -> bool {
    let mut inside = false;
    for (a, b) in ring_segments(ring) {
        if (a.y > point.y) != (b.y > point.y) {
            let x_cross = a.x + (point.y - a.y) / (b.y - a.y) * (b.x - a.x);
            if point.x < x_cross {
                inside = !inside;
            }
        }
    }
    inside
}

fn nearest_vertex(
    coordinates: &[MapCoordinate],
    point: &MapCoordinate,
    tolerance: f64,
) -> Option<usize> {
    coordinates
        .iter()
        .enumerate()
        .map(|(i, c)| (i, c.distance_to(point)))
        .filter(|(_, d)| *d <= tolerance)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _)| i)
}

/// Distance from a point to a line segment
fn distance_to_segment(point: &MapCoordinate, start: &MapCoordinate, end: &MapCoordinate) -> f64 {
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    let length_sq = dx * dx + dy * dy;

    if length_sq < 1e-12 {
        // Degenerate segment
        return point.distance_to(start);
    }

    let t = ((point.x - start.x) * dx + (point.y - start.y) * dy) / length_sq;
    let t = t.clamp(0.0, 1.0);

    let closest = MapCoordinate::new(start.x + t * dx, start.y + t * dy);
    point.distance_to(&closest)
}
