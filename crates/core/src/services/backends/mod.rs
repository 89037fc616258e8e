pub mod codesign;
pub mod xcrun;

pub use codesign::CodesignSigner;
pub use xcrun::XcrunProcessor;
