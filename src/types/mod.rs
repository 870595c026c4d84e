pub mod error;
pub mod table;
pub mod ty;

pub use error::{InvalidType, TypeError};
pub use table::{ConstructorInfo, TypeInfo, TypeTable};
pub use ty::{Type, TypeKind};
