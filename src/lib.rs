//! Job-flow graphs for a batch scheduler.
//!
//! A [`Flow`] is a directed-acyclic graph of commands and nested sub-flows
//! that always converges on its synthetic finish job. Flows are collected
//! into a [`Project`] and packed into a deployable zip archive of `.job` /
//! `.properties` files. The `web` client pushes the result to the
//! scheduler's HTTP API.

pub mod archive;
pub mod error;
pub mod jobs;
pub mod manifest;
pub mod web;

pub use error::{Error, Result};
pub use jobs::{Command, Flow, JobNode, Params, Project, Properties};
