pub mod audit_logs;
pub mod categories;
pub mod delivery_locations;
pub mod order_items;
pub mod orders;
pub mod product_images;
pub mod products;
pub mod service_areas;
pub mod users;

pub use audit_logs::Entity as AuditLogs;
pub use categories::Entity as Categories;
pub use delivery_locations::Entity as DeliveryLocations;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use product_images::Entity as ProductImages;
pub use products::Entity as Products;
pub use service_areas::Entity as ServiceAreas;
pub use users::Entity as Users;
