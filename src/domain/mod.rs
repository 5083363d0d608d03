pub mod collision;
pub mod geom;
pub mod intent;
pub mod stamina;
pub mod tile;
pub mod zone;
