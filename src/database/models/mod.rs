pub mod catalog;
pub mod exhibition;
pub mod fact;
pub mod item;
pub mod user;

pub use catalog::{Catalog, CatalogNode, CatalogPatch, NewCatalog};
pub use exhibition::{Exhibition, ExhibitionPatch, NewExhibition};
pub use fact::{Amount, AmountInput, Comment, CommentInput, Rate, RateInput};
pub use item::{Item, ItemPatch, ItemSummary, NewItem};
pub use user::{NewUser, User, UserPatch};
