/// The result of splitting a shape by a plane.
///
/// The plane is described by an axis and a bias: the negative half-space holds
/// the points `x` with `axis · x < bias`.
#[derive(Clone, Debug)]
pub enum SplitResult<T> {
    /// The split operation yielded two results: one lying on the negative half-space of the plane
    /// and the second lying on the positive half-space of the plane.
    Pair(T, T),
    /// The shape being split is fully contained in the negative half-space of the plane.
    Negative,
    /// The shape being split is fully contained in the positive half-space of the plane.
    Positive,
}
