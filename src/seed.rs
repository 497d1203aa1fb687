//! Seed datasets.
//!
//! Served as fallback data when a backend read fails, and as the initial
//! contents of local storage in demo mode.

use crate::model::{
    Audience, Banner, Branch, Category, Customer, CustomerReport, DailySales, DeliveryStaff,
    Discount, DiscountKind, HomepageSettings, MembershipPlan, Notification, Order, OrderItem,
    OrderStatus, OrderTotals, OverviewReport, PaymentStatus, Product, ProductReport, ProductSales,
    SalesReport, StaffPerformance, Status, User, Variant,
};

fn s(text: &str) -> String {
    text.to_string()
}

pub fn customers() -> Vec<Customer> {
    let rows = [
        ("CUST-001", "Asha Verma", "asha.verma@example.com", "98450 12001", Status::Active, Some("Gold"), 42, 18_420.0),
        ("CUST-002", "Rahul Menon", "rahul.menon@example.com", "98450 12002", Status::Active, Some("Silver"), 17, 6_310.5),
        ("CUST-003", "Farah Khan", "farah.khan@example.com", "98450 12003", Status::Inactive, None, 3, 540.0),
        ("CUST-004", "Vikram Rao", "vikram.rao@example.com", "98450 12004", Status::Active, Some("Platinum"), 88, 41_905.0),
        ("CUST-005", "Neha Joshi", "neha.joshi@example.com", "98450 12005", Status::Active, None, 9, 2_115.0),
    ];

    rows.into_iter()
        .map(|(id, name, email, phone, status, membership, orders, spent)| Customer {
            id: s(id),
            name: s(name),
            email: s(email),
            phone: s(phone),
            status,
            membership: membership.map(s),
            join_date: Some(s("2025-06-01")),
            total_orders: orders,
            total_spent: spent,
        })
        .collect()
}

fn variant(id: &str, label: &str, value: f64, unit: &str, price: f64, stock: u32) -> Variant {
    Variant {
        id: Some(s(id)),
        label: s(label),
        value,
        unit: s(unit),
        price,
        stock,
        image: None,
    }
}

pub fn products() -> Vec<Product> {
    vec![
        Product {
            id: s("PROD-001"),
            name: s("A2 Cow Milk"),
            description: s("Fresh A2 milk from grass-fed cows, delivered every morning."),
            price: 68.0,
            stock: 240,
            unit: s("litre"),
            category: Some(s("milk")),
            image: Some(s("/uploads/products/a2-milk.jpg")),
            is_available: true,
            is_featured: true,
            tags: vec![s("a2"), s("fresh")],
            variants: vec![
                variant("VAR-001", "500 ml", 500.0, "ml", 36.0, 120),
                variant("VAR-002", "1 l", 1.0, "l", 68.0, 120),
            ],
        },
        Product {
            id: s("PROD-002"),
            name: s("Malai Paneer"),
            description: s("Soft paneer made the same day."),
            price: 95.0,
            stock: 60,
            unit: s("200 g"),
            category: Some(s("paneer")),
            image: Some(s("/uploads/products/paneer.jpg")),
            is_available: true,
            is_featured: false,
            tags: vec![s("fresh")],
            variants: Vec::new(),
        },
        Product {
            id: s("PROD-003"),
            name: s("Desi Ghee"),
            description: s("Bilona churned ghee."),
            price: 650.0,
            stock: 35,
            unit: s("500 ml"),
            category: Some(s("ghee")),
            image: Some(s("/uploads/products/ghee.jpg")),
            is_available: true,
            is_featured: true,
            tags: vec![s("bilona")],
            variants: vec![
                variant("VAR-003", "250 ml", 250.0, "ml", 340.0, 20),
                variant("VAR-004", "500 ml", 500.0, "ml", 650.0, 15),
            ],
        },
        Product {
            id: s("PROD-004"),
            name: s("Set Curd"),
            description: s("Thick curd set in clay pots."),
            price: 45.0,
            stock: 0,
            unit: s("400 g"),
            category: Some(s("curd")),
            image: None,
            is_available: false,
            is_featured: false,
            tags: Vec::new(),
            variants: Vec::new(),
        },
    ]
}

fn item(product_id: &str, name: &str, quantity: u32, price: f64) -> OrderItem {
    OrderItem {
        product_id: s(product_id),
        product_name: s(name),
        quantity,
        price,
    }
}

pub fn orders() -> Vec<Order> {
    let rows = [
        ("ORD-1234", "CUST-001", "Asha Verma", vec![item("PROD-001", "A2 Cow Milk", 2, 68.0)], OrderStatus::Completed, PaymentStatus::Paid),
        ("ORD-1235", "CUST-002", "Rahul Menon", vec![item("PROD-002", "Malai Paneer", 1, 95.0), item("PROD-001", "A2 Cow Milk", 1, 68.0)], OrderStatus::Pending, PaymentStatus::Pending),
        ("ORD-1236", "CUST-004", "Vikram Rao", vec![item("PROD-003", "Desi Ghee", 1, 650.0)], OrderStatus::Completed, PaymentStatus::Paid),
        ("ORD-1237", "CUST-005", "Neha Joshi", vec![item("PROD-004", "Set Curd", 2, 45.0)], OrderStatus::Cancelled, PaymentStatus::Refunded),
    ];

    rows.into_iter()
        .map(|(id, customer_id, customer_name, items, status, payment_status)| {
            let totals = OrderTotals::compute(&items, None);
            Order {
                id: s(id),
                customer_id: s(customer_id),
                customer_name: s(customer_name),
                items,
                subtotal: totals.subtotal,
                discount: totals.discount,
                total: totals.total,
                status,
                payment_status,
                branch_id: Some(s("BR-001")),
                delivery_instructions: None,
                created_at: None,
            }
        })
        .collect()
}

pub fn delivery_staff() -> Vec<DeliveryStaff> {
    let rows = [
        ("STAFF-001", "Ravi Kumar", "98860 40001", Status::Active, 4.8, 1_240, 22.0),
        ("STAFF-002", "Suresh Naik", "98860 40002", Status::Active, 4.5, 860, 27.5),
        ("STAFF-003", "Imran Sheikh", "98860 40003", Status::Inactive, 4.1, 310, 31.0),
    ];

    rows.into_iter()
        .map(|(id, name, phone, status, rating, completed, avg)| DeliveryStaff {
            id: s(id),
            name: s(name),
            phone: s(phone),
            email: None,
            status,
            branch_id: Some(s("BR-001")),
            vehicle: Some(s("two-wheeler")),
            avatar: None,
            performance: StaffPerformance {
                rating,
                completed_orders: completed,
                average_delivery_time: avg,
            },
        })
        .collect()
}

pub fn branches() -> Vec<Branch> {
    vec![
        Branch {
            id: s("BR-001"),
            name: s("Indiranagar"),
            address: s("12 CMH Road, Indiranagar, Bengaluru"),
            phone: s("080 4000 1001"),
            manager: Some(s("Kavya Shetty")),
            status: Status::Active,
        },
        Branch {
            id: s("BR-002"),
            name: s("Jayanagar"),
            address: s("44 9th Main, Jayanagar, Bengaluru"),
            phone: s("080 4000 1002"),
            manager: None,
            status: Status::Active,
        },
    ]
}

pub fn categories() -> Vec<Category> {
    ["milk", "curd", "paneer", "ghee", "butter"]
        .into_iter()
        .map(|name| Category {
            id: s(name),
            name: format!("{}{}", name[..1].to_uppercase(), &name[1..]),
            description: String::new(),
            image: None,
        })
        .collect()
}

pub fn discounts() -> Vec<Discount> {
    vec![
        Discount {
            id: s("DISC-001"),
            code: s("FRESH10"),
            description: s("10% off on orders above 300"),
            kind: DiscountKind::Percentage,
            value: 10.0,
            min_order: 300.0,
            max_uses: Some(500),
            used_count: 128,
            status: Status::Active,
            valid_from: None,
            valid_until: None,
        },
        Discount {
            id: s("DISC-002"),
            code: s("WELCOME50"),
            description: s("50 off the first order"),
            kind: DiscountKind::Fixed,
            value: 50.0,
            min_order: 0.0,
            max_uses: None,
            used_count: 61,
            status: Status::Inactive,
            valid_from: None,
            valid_until: None,
        },
    ]
}

pub fn memberships() -> Vec<MembershipPlan> {
    let rows = [
        ("PLAN-SILVER", "Silver", 199.0, 30, 5.0, 140),
        ("PLAN-GOLD", "Gold", 499.0, 90, 10.0, 62),
        ("PLAN-PLATINUM", "Platinum", 1_799.0, 365, 15.0, 18),
    ];

    rows.into_iter()
        .map(|(id, name, price, duration, discount, members)| MembershipPlan {
            id: s(id),
            name: s(name),
            price,
            duration,
            discount_percent: discount,
            benefits: vec![format!("{}% off every order", discount)],
            status: Status::Active,
            member_count: members,
        })
        .collect()
}

pub fn notifications() -> Vec<Notification> {
    vec![
        Notification {
            id: s("NOTIF-001"),
            title: s("Morning delivery delayed"),
            message: s("Heavy rain in Jayanagar; deliveries may run 30 minutes late."),
            kind: Some(s("alert")),
            audience: Audience::Customers,
            read: false,
            sent_at: None,
        },
        Notification {
            id: s("NOTIF-002"),
            title: s("New route assigned"),
            message: s("Route 7 has been added to the Indiranagar branch."),
            kind: Some(s("info")),
            audience: Audience::DeliveryStaff,
            read: true,
            sent_at: None,
        },
    ]
}

pub fn users() -> Vec<User> {
    vec![
        User {
            id: s("USER-001"),
            name: s("Admin"),
            email: s("admin@dynastydairy.in"),
            role: s("admin"),
            status: Status::Active,
            last_login: None,
        },
        User {
            id: s("USER-002"),
            name: s("Kavya Shetty"),
            email: s("kavya@dynastydairy.in"),
            role: s("manager"),
            status: Status::Active,
            last_login: None,
        },
    ]
}

pub fn banners() -> Vec<Banner> {
    vec![Banner {
        id: s("BANNER-001"),
        title: s("Fresh every morning"),
        subtitle: Some(s("A2 milk at your door by 7 am")),
        image: Some(s("/uploads/banners/morning.jpg")),
        link: Some(s("/products/PROD-001")),
        position: 1,
        is_active: true,
    }]
}

pub fn homepage_settings() -> HomepageSettings {
    HomepageSettings {
        hero_title: s("Dynasty Dairy"),
        hero_subtitle: s("Farm to doorstep, every day"),
        hero_image: None,
        announcement: None,
        featured_product_ids: vec![s("PROD-001"), s("PROD-003")],
        show_categories: true,
        show_testimonials: true,
        banners: banners(),
    }
}

/// Overview derived from the seed orders and products.
pub fn overview_report() -> OverviewReport {
    let orders = orders();
    let completed: Vec<&Order> = orders
        .iter()
        .filter(|o| o.status == OrderStatus::Completed)
        .collect();
    let revenue: f64 = completed.iter().map(|o| o.total).sum();
    let customers = customers();
    let products = products();

    OverviewReport {
        sales: SalesReport {
            total_revenue: revenue,
            total_orders: orders.len() as u32,
            average_order_value: if completed.is_empty() {
                0.0
            } else {
                revenue / completed.len() as f64
            },
            daily: vec![DailySales {
                date: s("2026-03-01"),
                revenue,
                orders: completed.len() as u32,
            }],
        },
        customers: CustomerReport {
            total_customers: customers.len() as u32,
            new_customers: 1,
            active_customers: customers.iter().filter(|c| c.status.is_active()).count() as u32,
            retention_rate: 0.0,
        },
        products: ProductReport {
            total_products: products.len() as u32,
            low_stock: products.iter().filter(|p| p.stock < 40).count() as u32,
            top_products: vec![ProductSales {
                product_id: s("PROD-001"),
                name: s("A2 Cow Milk"),
                quantity: 3,
                revenue: 204.0,
            }],
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Resource;

    #[test]
    fn test_seed_records_are_valid() {
        assert!(customers().iter().all(|c| c.validate().is_ok()));
        assert!(products().iter().all(|p| p.validate().is_ok()));
        assert!(orders().iter().all(|o| o.validate().is_ok()));
        assert!(discounts().iter().all(|d| d.validate().is_ok()));
        assert!(users().iter().all(|u| u.validate().is_ok()));
    }

    #[test]
    fn test_seed_order_totals() {
        let orders = orders();
        assert_eq!(orders[1].subtotal, 163.0);
        assert_eq!(orders[1].total, 163.0);
    }

    #[test]
    fn test_overview_counts() {
        let overview = overview_report();
        assert_eq!(overview.sales.total_orders, 4);
        assert_eq!(overview.sales.total_revenue, 786.0);
        assert_eq!(overview.customers.active_customers, 4);
        assert_eq!(overview.products.low_stock, 2);
    }
}
