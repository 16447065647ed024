pub mod chapter;
pub mod track;

pub mod prelude {
    pub use super::chapter::Entity as Chapter;
    pub use super::track::Entity as Track;
}
