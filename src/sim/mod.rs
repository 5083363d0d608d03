pub mod camera;
pub mod clock;
pub mod event;
pub mod level;
pub mod route;
pub mod save;
pub mod step;
pub mod world;
