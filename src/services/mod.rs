pub mod analytics;
pub mod fees;
pub mod gift_cards;
pub mod markdown;
pub mod rates;
pub mod security;
pub mod users;

pub use analytics::{AnalyticsService, Transaction, TransactionFilters, TransactionSource};
pub use fees::{CryptoFee, CryptoFeeService, CryptoFeeSource};
pub use gift_cards::{
    GiftCardRate, GiftCardRateSource, GiftCardRateUpdate, GiftCardService, NewGiftCardRate,
};
pub use markdown::AssetMarkdownService;
pub use rates::{RateOverview, RateService};
pub use security::SecurityService;
pub use users::{FundingResult, User, UserService, UserSource};
