pub mod owner;

pub use owner::OwnerId;
