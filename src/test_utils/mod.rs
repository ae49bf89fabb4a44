#![allow(missing_docs)]

pub(crate) mod app;
pub(crate) mod db;

pub(crate) use app::{TEST_PASSWORD, TestApp};
pub(crate) use db::{create_test_user, get_test_connection};
