pub mod claims;
pub mod coupons;
pub mod directory;
pub mod invoices;
pub mod memberships;
pub mod payments;
pub mod plans;
pub mod profiles;
pub mod service_requests;
pub mod settings;
pub mod status;
pub mod wallets;

pub use claims::{ReimbursementClaim, SqlClaimRepository};
pub use coupons::{Coupon, SqlCouponRepository};
pub use directory::{City, Department, Franchise, SqlDirectoryRepository};
pub use invoices::{Invoice, SqlInvoiceRepository};
pub use memberships::{EcardMember, MembershipView, SqlMembershipRepository};
pub use payments::{Payment, SqlPaymentRepository};
pub use plans::{Plan, SqlPlanRepository};
pub use profiles::{Profile, ProfileUpdate, SqlProfileRepository};
pub use service_requests::{ServiceRequest, SqlServiceRequestRepository};
pub use settings::{PaymentSettings, PaymentSettingsUpdate, SqlPaymentSettingsRepository, RAZORPAY_PROVIDER};
pub use status::{
    ClaimStatus, FranchiseStatus, MembershipStatus, PaymentStatus, ServiceRequestStatus,
    TransactionKind, WithdrawalStatus,
};
pub use wallets::{SqlWalletRepository, Wallet, WalletTransaction, WithdrawalRequest};
