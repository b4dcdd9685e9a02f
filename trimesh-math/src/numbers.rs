// This holds traits that are used throughout the program
// to make things easy for us:

use num_traits;

// This is my own float trait versus the num_traits one:

pub trait Float: num_traits::Float + num_traits::Bounded {
    const PI: Self;

    fn two() -> Self;
    fn half() -> Self;
}

impl Float for f32 {
    const PI: Self = 3.14159265358979323846f32;

    fn two() -> Self {
        2f32
    }

    fn half() -> Self {
        0.5f32
    }
}

impl Float for f64 {
    const PI: Self = 3.14159265358979323846;

    fn two() -> Self {
        2.
    }

    fn half() -> Self {
        0.5
    }
}
