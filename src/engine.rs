//! Rendering engine facade.
//!
//! A [`Session`] brackets all engine work. Within it, animations are loaded, resized and
//! handed to a [`Saver`], which renders and encodes them on [`Saver::sync`]:
//!
//! ```no_run
//! use lottie2gif::engine::{Session, Shape};
//! use lottie2gif::foundation::core::Rgb8;
//!
//! # fn main() -> lottie2gif::ConvertResult<()> {
//! let session = Session::init()?;
//! let mut animation = session.load("anim.json")?;
//! animation.set_size(200.0, 100.0)?;
//!
//! let mut saver = session.saver();
//! saver.background(Shape::rect(0.0, 0.0, 200.0, 100.0).with_fill(Rgb8::new(255, 255, 255)))?;
//! saver.save(animation, "anim.gif", 0, 30)?;
//! saver.sync()?;
//! # Ok(())
//! # }
//! ```

pub mod animation;
pub mod saver;
pub mod session;
pub mod shape;

pub use animation::Animation;
pub use saver::Saver;
pub use session::Session;
pub use shape::Shape;
