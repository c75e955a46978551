//! Scene description and asset loading for the lumen renderer.
//!
//! This crate owns everything that happens before a render starts:
//!
//! - **Scene files**: a JSON document describing the camera, a texture table,
//!   a material table, and an object list (`scene` module). Parsing and
//!   range validation happen here; resolving names into render-world objects
//!   is the renderer's job.
//! - **Texture images**: decoding image files into linear RGB pixel data
//!   (`texture` module).

pub mod scene;
pub mod texture;

pub use scene::{
    CameraConfig, MaterialDesc, ObjectDesc, SceneError, SceneFile, TextureDesc, TextureRef,
};
pub use texture::{ImageData, ImageLoadError};
