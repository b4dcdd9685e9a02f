pub mod numbers;
pub mod util;
pub mod vector;

use numbers::Float;
use vector::Vec2;

/// Twice the signed area of the triangle `(a, b, c)`: positive under CCW
/// winding, negative under CW. `Tri::area` and the orientation check in
/// `Tri_setNodes` both reduce to this.
pub fn signed_area2<T: Float>(a: Vec2<T>, b: Vec2<T>, c: Vec2<T>) -> T {
    let ab = b - a;
    let ac = c - a;
    ab.x * ac.y - ab.y * ac.x
}
