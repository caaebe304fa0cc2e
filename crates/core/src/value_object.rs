//! Value object trait: equality by value, not identity.
//!
//! Value objects have **no identity**; they are defined entirely by their
//! attribute values. Two value objects with the same values are equal.

/// Marker trait for value objects.
///
/// In this workspace: prices, image coordinates, canonical variant keys and
/// body measurements. Each is immutable once built; "changing" one means
/// building a new one.
///
/// ```ignore
/// #[derive(Debug, Clone, Copy, PartialEq)]
/// struct Coordinate { x: f64, y: f64 }
///
/// impl ValueObject for Coordinate {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
