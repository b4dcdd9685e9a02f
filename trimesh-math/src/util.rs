// This is used so that we can have efficient comparisons
// with PartialOrd types (like floats). According to the compiler
// explorer, this converts to the proper minsd/maxsd instruction:
pub fn min<T: PartialOrd>(v0: T, v1: T) -> T {
    if v0 < v1 {
        v0
    } else {
        v1
    }
}

/// See `min` function for details.
pub fn max<T: PartialOrd>(v0: T, v1: T) -> T {
    if v0 > v1 {
        v0
    } else {
        v1
    }
}
