pub mod reload;

pub use reload::ReloadConfigUseCase;
