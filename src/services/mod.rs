pub mod catalog;
pub mod document_store;
pub mod harvester;
pub mod warehouse;
pub mod youtube;
