//! Novelly Web Client
//!
//! Novel-reading single-page application built with Leptos (WASM).
//!
//! # Architecture
//!
//! Client-side rendered. Routing, state, REST calls and page logic live in
//! the `novelly` crate; this crate supplies the browser pieces (fetch
//! transport, `localStorage`, `hashchange`) and the views.

use leptos::*;

mod api;
mod app;
mod components;
mod pages;
mod state;

fn main() {
    // Set up panic hook for better error messages in WASM
    console_error_panic_hook::set_once();

    mount_to_body(|| view! { <app::App /> });
}
