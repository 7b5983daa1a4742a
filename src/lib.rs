//! Feed-forward MNIST digit classifier built with [Burn](https://burn.dev).
//!
//! The crate covers the classic workflow end to end: batch and normalize the
//! MNIST dataset, train a small dense network with SGD, evaluate loss and
//! accuracy on the test split, and run inference from a saved checkpoint.

pub mod data;
pub mod evaluation;
pub mod inference;
pub mod model;
pub mod training;
