mod profile;
mod project;
mod schema;
mod serde;

use anyhow::{Context, Result};
use ::serde::de::DeserializeOwned;
use ::serde::Serialize;
use serde_json::Value;

pub use self::{profile::*, project::*, schema::*};

/// A kind of object the host framework can manage through this provider.
///
/// Every operation gets the state as the host framework has it recorded (or as
/// the user declared it) and, where it returns one, hands back the state read
/// from LXD afterwards.
pub trait Resource {
    type State: Serialize + DeserializeOwned;

    fn schema() -> Schema;

    fn create(&mut self, declared: &Self::State) -> Result<Self::State>;

    fn read(&mut self, state: &Self::State) -> Result<Self::State>;

    /// Moves the object from `prior` to `declared`.
    ///
    /// Only attributes that differ between both states are submitted, so that
    /// changes made to other attributes outside of the host framework survive.
    fn update(&mut self, prior: &Self::State, declared: &Self::State) -> Result<Self::State>;

    fn delete(&mut self, state: &Self::State) -> Result<()>;

    /// Returns whether the object still exists; only a missing object yields
    /// `false`, any other failure is propagated.
    fn exists(&mut self, state: &Self::State) -> Result<bool>;

    /// Reads an object that's not been managed so far, given its identifier
    /// (`name` or `remote:name`).
    fn import(&mut self, id: &str) -> Result<Self::State>;

    /// Reads state from the host framework's representation.
    fn decode(value: Value) -> Result<Self::State> {
        serde_json::from_value(value).context("Couldn't decode resource's state")
    }

    fn encode(state: &Self::State) -> Result<Value> {
        serde_json::to_value(state).context("Couldn't encode resource's state")
    }
}
