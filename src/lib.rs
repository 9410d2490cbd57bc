pub mod bind;
pub mod camera;
pub mod geometry;
pub mod pipeline;
pub mod plain;
pub mod render;
pub mod text;
pub mod texture;
pub mod window;

// a text drawing demo, structured like this:
// - `text` turns a string into quads using a fixed glyph table, and owns the pipeline that draws them
// - `render` owns the device, the surface and the frame lifecycle
// - `window` drives the event loop and hands the renderer to the app
//
// the glyph table and the atlas image are prebuilt assets, nothing here rasterises fonts.
