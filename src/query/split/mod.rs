pub use self::split::SplitResult;

mod split;
mod split_surface;
