#![allow(missing_docs)]

pub(crate) mod html;
pub(crate) mod http;
pub(crate) mod store;

pub(crate) use html::{assert_valid_html, parse_html_document};
pub(crate) use http::{assert_content_type, assert_status_ok};
pub(crate) use store::{get_test_app_state, get_test_store, insert_transaction};
