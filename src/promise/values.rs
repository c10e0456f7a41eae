//! Conveniences for promises carrying collections or raw payloads.

use super::handle::Promise;

impl<A, E> Promise<Vec<A>, E>
where
    A: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    /// Maps each element of the eventual vector.
    ///
    /// ```
    /// use pledge::Promise;
    ///
    /// let p: Promise<Vec<i32>, &str> =
    ///     Promise::resolved(vec![1, 2, 3]).map_values(|x| x * 2);
    /// assert_eq!(p.wait(), Ok(vec![2, 4, 6]));
    /// ```
    pub fn map_values<B, F>(&self, transform: F) -> Promise<Vec<B>, E>
    where
        B: Clone + Send + 'static,
        F: Fn(A) -> B + Send + 'static,
    {
        self.map(move |values| values.into_iter().map(&transform).collect())
    }

    /// Keeps only the elements for which `keep` returns true.
    pub fn filter_values<F>(&self, keep: F) -> Promise<Vec<A>, E>
    where
        F: Fn(&A) -> bool + Send + 'static,
    {
        self.map(move |values| values.into_iter().filter(|value| keep(value)).collect())
    }

    /// Maps each element through an `Option`-returning transform,
    /// dropping the `None`s.
    pub fn compact_map_values<B, F>(&self, transform: F) -> Promise<Vec<B>, E>
    where
        B: Clone + Send + 'static,
        F: Fn(A) -> Option<B> + Send + 'static,
    {
        self.map(move |values| values.into_iter().filter_map(&transform).collect())
    }

    /// Maps each element to a promise and aggregates the results: the
    /// output succeeds with every element's value in element order, or
    /// fails with the first observed element failure.
    pub fn flat_map_values<B, F>(&self, transform: F) -> Promise<Vec<B>, E>
    where
        B: Clone + Send + 'static,
        F: Fn(A) -> Promise<B, E> + Send + 'static,
    {
        self.flat_map(move |values| crate::combinator::all(values.into_iter().map(&transform)))
    }

    /// Folds the eventual vector into a single value.
    pub fn reduce_values<B, F>(&self, initial: B, combine: F) -> Promise<B, E>
    where
        B: Clone + Send + 'static,
        F: Fn(B, A) -> B + Send + 'static,
    {
        self.map(move |values| values.into_iter().fold(initial, &combine))
    }

    /// Extracts the first element, failing with `error` when the vector
    /// is empty.
    pub fn first_value<G>(&self, error: G) -> Promise<A, E>
    where
        G: FnOnce() -> E + Send + 'static,
    {
        self.compact_map(|values| values.into_iter().next(), error)
    }
}

impl<E> Promise<Vec<u8>, E>
where
    E: Clone + Send + 'static + From<serde_json::Error>,
{
    /// Decodes the eventual byte payload as JSON.
    ///
    /// Turns a raw response body into a typed value without leaving the
    /// promise chain.
    pub fn decode_json<D>(&self) -> Promise<D, E>
    where
        D: serde::de::DeserializeOwned + Clone + Send + 'static,
    {
        self.try_map(|bytes| serde_json::from_slice(&bytes).map_err(E::from))
    }
}
