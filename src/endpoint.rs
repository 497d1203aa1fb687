//! Endpoint registry: logical operations mapped to URL path templates.
//!
//! Templates are relative to the API base URL and use `:name` placeholders:
//!
//! ```
//! use dynasty_admin::endpoint::Endpoint;
//!
//! let path = Endpoint::ProductVariant.path(&[("id", "p1"), ("variantId", "v9")]);
//! assert_eq!(path, "/products/p1/variants/v9");
//! ```

use std::fmt;

/// Every backend operation the dashboard calls.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Endpoint {
    AuthLogin,
    AuthLogout,
    AuthProfile,
    AuthRegister,

    Customers,
    Customer,
    CustomerStatus,
    CustomerOrders,

    Products,
    Product,
    ProductAvailability,
    ProductVariants,
    ProductVariant,

    Categories,
    Category,

    Orders,
    Order,
    OrderStatus,

    DeliveryStaff,
    DeliveryStaffMember,
    DeliveryStaffStatus,
    DeliveryStaffPerformance,

    Branches,
    Branch,

    Notifications,
    Notification,
    NotificationSend,
    NotificationRead,

    WalletDiscounts,
    WalletDiscount,
    WalletDiscountStatus,

    Memberships,
    Membership,
    MembershipStatus,

    ReportSales,
    ReportCustomers,
    ReportProducts,

    HomepageSettings,
    HomepageBanners,
    HomepageBanner,

    Users,
    User,
    UserStatus,
}

impl Endpoint {
    /// URL template for this operation.
    pub fn template(&self) -> &'static str {
        match self {
            Endpoint::AuthLogin => "/auth/login",
            Endpoint::AuthLogout => "/auth/logout",
            Endpoint::AuthProfile => "/auth/profile",
            Endpoint::AuthRegister => "/auth/register",

            Endpoint::Customers => "/customers",
            Endpoint::Customer => "/customers/:id",
            Endpoint::CustomerStatus => "/customers/:id/status",
            Endpoint::CustomerOrders => "/customers/:id/orders",

            Endpoint::Products => "/products",
            Endpoint::Product => "/products/:id",
            Endpoint::ProductAvailability => "/products/:id/availability",
            Endpoint::ProductVariants => "/products/:id/variants",
            Endpoint::ProductVariant => "/products/:id/variants/:variantId",

            Endpoint::Categories => "/categories",
            Endpoint::Category => "/categories/:id",

            Endpoint::Orders => "/orders",
            Endpoint::Order => "/orders/:id",
            Endpoint::OrderStatus => "/orders/:id/status",

            Endpoint::DeliveryStaff => "/delivery-staff",
            Endpoint::DeliveryStaffMember => "/delivery-staff/:id",
            Endpoint::DeliveryStaffStatus => "/delivery-staff/:id/status",
            Endpoint::DeliveryStaffPerformance => "/delivery-staff/:id/performance",

            Endpoint::Branches => "/branches",
            Endpoint::Branch => "/branches/:id",

            Endpoint::Notifications => "/notifications",
            Endpoint::Notification => "/notifications/:id",
            Endpoint::NotificationSend => "/notifications/send",
            Endpoint::NotificationRead => "/notifications/:id/read",

            Endpoint::WalletDiscounts => "/wallet/discounts",
            Endpoint::WalletDiscount => "/wallet/discounts/:id",
            Endpoint::WalletDiscountStatus => "/wallet/discounts/:id/status",

            Endpoint::Memberships => "/memberships",
            Endpoint::Membership => "/memberships/:id",
            Endpoint::MembershipStatus => "/memberships/:id/status",

            Endpoint::ReportSales => "/reports/sales",
            Endpoint::ReportCustomers => "/reports/customers",
            Endpoint::ReportProducts => "/reports/products",

            Endpoint::HomepageSettings => "/homepage/settings",
            Endpoint::HomepageBanners => "/homepage/banners",
            Endpoint::HomepageBanner => "/homepage/banners/:id",

            Endpoint::Users => "/users",
            Endpoint::User => "/users/:id",
            Endpoint::UserStatus => "/users/:id/status",
        }
    }

    /// Template with parameters substituted.
    pub fn path(&self, params: &[(&str, &str)]) -> String {
        fill_template(self.template(), params)
    }

    /// Template for an operation that takes only `:id`.
    pub fn with_id(&self, id: &dyn fmt::Display) -> String {
        self.path(&[("id", &id.to_string())])
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} ({})", self, self.template())
    }
}

/// Substitute `:name` placeholders in `template`.
///
/// A placeholder runs from `:` to the next `/`, `?` or end of string.
/// Placeholders with no matching parameter are left as literal text.
pub fn fill_template(template: &str, params: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len() + 16);
    let mut rest = template;

    while let Some(start) = rest.find(':') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let end = after.find(['/', '?']).unwrap_or(after.len());
        let name = &after[..end];

        match params.iter().find(|(key, _)| *key == name) {
            Some((_, value)) if !name.is_empty() => out.push_str(value),
            _ => {
                out.push(':');
                out.push_str(name);
            }
        }

        rest = &after[end..];
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_single_param() {
        assert_eq!(Endpoint::Customer.with_id(&"c42"), "/customers/c42");
        assert_eq!(
            Endpoint::DeliveryStaffStatus.with_id(&7),
            "/delivery-staff/7/status"
        );
    }

    #[test]
    fn test_fill_multiple_params() {
        let path = fill_template(
            "/products/:id/variants/:variantId",
            &[("variantId", "v2"), ("id", "p1")],
        );
        assert_eq!(path, "/products/p1/variants/v2");
    }

    #[test]
    fn test_missing_param_passes_through() {
        let path = fill_template("/products/:id/variants/:variantId", &[("id", "p1")]);
        assert_eq!(path, "/products/p1/variants/:variantId");
    }

    #[test]
    fn test_template_without_placeholders() {
        assert_eq!(Endpoint::Customers.path(&[("id", "ignored")]), "/customers");
    }

    #[test]
    fn test_bare_colon_kept() {
        assert_eq!(fill_template("/a/:/b", &[("", "x")]), "/a/:/b");
    }
}
