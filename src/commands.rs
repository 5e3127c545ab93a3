mod map;

pub use self::map::{map, MapError};
