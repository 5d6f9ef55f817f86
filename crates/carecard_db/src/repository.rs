//! Repository trait for tables that get full admin CRUD.

use std::error::Error;
use std::fmt::Debug;
use std::future::Future;

/// Basic CRUD over one entity type.
pub trait Repository<T, E>
where
    T: Clone + Debug,
    E: Error + Debug,
{
    /// Create a new entity and return it as stored.
    fn create(&self, entity: T) -> impl Future<Output = Result<T, E>> + Send;

    /// Read an entity by id; `None` if it does not exist.
    fn read(&self, id: &str) -> impl Future<Output = Result<Option<T>, E>> + Send;

    /// Replace an entity and return it as stored.
    fn update(&self, entity: T) -> impl Future<Output = Result<T, E>> + Send;
}
