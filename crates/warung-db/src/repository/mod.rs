//! # Repository Layer
//!
//! Repository pattern implementations for each entity.
//!
//! ## Structure
//! ```text
//! repository/
//! ├── product.rs   - Product CRUD + atomic stock ledger
//! ├── customer.rs  - Customer CRUD (deletes blocked while invoices exist)
//! └── invoice.rs   - Invoice persistence, transactional checkout commit,
//!                    status transitions, sequence recovery
//! ```
//!
//! Each repository owns a clone of the shared `SqlitePool` and exposes
//! async methods returning `DbResult<T>`. Repositories hold no business
//! rules; validation and workflow decisions live in warung-core and
//! warung-engine.

pub mod customer;
pub mod invoice;
pub mod product;

pub use customer::CustomerRepository;
pub use invoice::InvoiceRepository;
pub use product::ProductRepository;
