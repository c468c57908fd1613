//! shelterdb - CRUD access to an animal shelter collection
//!
//! A [`store::RecordStore`] wraps one collection of a document database with
//! validated create, read, update and delete operations. The
//! [`dashboard`] module serves it over HTTP and the [`cli`] module drives
//! both from the command line.

pub mod cli;
pub mod dashboard;
pub mod observability;
pub mod store;
