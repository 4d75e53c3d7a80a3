pub mod clean;
pub mod copy;
pub mod favicon;
pub mod html;
pub mod images;
pub mod lint;
pub mod pagespeed;
pub mod scripts;
pub mod service_worker;
pub mod styles;
