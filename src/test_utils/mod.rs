#![allow(missing_docs)]

pub(crate) mod db;
pub(crate) mod form;
pub(crate) mod html;
pub(crate) mod http;

pub(crate) use db::{
    TEST_PASSWORD, create_test_category, create_test_user, get_test_connection, shared_connection,
};
pub(crate) use form::{
    assert_form_error_message, assert_form_input, assert_form_input_with_value, assert_hx_endpoint,
    must_get_form,
};
pub(crate) use html::{
    assert_valid_html, element_text, must_select_one, parse_html_document, parse_html_fragment,
};
pub(crate) use http::{assert_hx_redirect, assert_status, get_header};
