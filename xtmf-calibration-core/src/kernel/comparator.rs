/// a binary predicate over two lanes, used to produce 0/1 flags.
///
/// gating comparators (AND, OR) treat any non-zero lane as true. a comparator
/// may report an absorbing element: a broadcast scalar that decides every lane
/// on its own, letting the kernel fill the destination without reading data.
pub trait Comparator: Send + Sync {
    fn compare(lhs: f32, rhs: f32) -> bool;

    /// the flag every lane receives when the broadcast operand is `scalar`,
    /// if that is independent of the other operand.
    fn absorbing(_scalar: f32) -> Option<f32> {
        None
    }
}

pub struct Equal;
pub struct NotEqual;
pub struct LessThan;
pub struct LessThanOrEqual;
pub struct GreaterThan;
pub struct GreaterThanOrEqual;
pub struct And;
pub struct Or;

impl Comparator for Equal {
    #[inline(always)]
    fn compare(lhs: f32, rhs: f32) -> bool {
        lhs == rhs
    }
}

impl Comparator for NotEqual {
    #[inline(always)]
    fn compare(lhs: f32, rhs: f32) -> bool {
        lhs != rhs
    }
}

impl Comparator for LessThan {
    #[inline(always)]
    fn compare(lhs: f32, rhs: f32) -> bool {
        lhs < rhs
    }
}

impl Comparator for LessThanOrEqual {
    #[inline(always)]
    fn compare(lhs: f32, rhs: f32) -> bool {
        lhs <= rhs
    }
}

impl Comparator for GreaterThan {
    #[inline(always)]
    fn compare(lhs: f32, rhs: f32) -> bool {
        lhs > rhs
    }
}

impl Comparator for GreaterThanOrEqual {
    #[inline(always)]
    fn compare(lhs: f32, rhs: f32) -> bool {
        lhs >= rhs
    }
}

impl Comparator for And {
    #[inline(always)]
    fn compare(lhs: f32, rhs: f32) -> bool {
        (lhs != 0.0) & (rhs != 0.0)
    }

    fn absorbing(scalar: f32) -> Option<f32> {
        (scalar == 0.0).then_some(0.0)
    }
}

impl Comparator for Or {
    #[inline(always)]
    fn compare(lhs: f32, rhs: f32) -> bool {
        (lhs != 0.0) | (rhs != 0.0)
    }

    fn absorbing(scalar: f32) -> Option<f32> {
        (scalar != 0.0).then_some(1.0)
    }
}
