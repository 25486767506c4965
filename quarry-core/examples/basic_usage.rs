use quarry_core::{
    table, DeleteBuilder, Dialect, InsertBuilder, QueryBuilder, Statement, UpdateBuilder, Value,
    PlaceholderStyle,
};

fn main() -> quarry_core::Result<()> {
    // SELECT with joins, conditions and pagination
    let mut select = table("users");
    select
        .set_fields(("users.id", "users.name"))
        .set_join("left", "orders", "orders.user_id = users.id")?
        .set_where("users.age > :age")
        .append_where("AND users.status = :status")
        .set_parameter([("age", Value::from(18)), ("status", Value::from("active"))])
        .set_order("users.name", "asc")?
        .set_limit(10)
        .set_offset(5);

    println!("SELECT SQL: {}", select.to_sql());

    // The same query for an OFFSET/FETCH server
    select.set_dialect(Dialect::OffsetFetch);
    println!("OFFSET/FETCH SQL: {}", select.to_sql());

    // INSERT
    let insert = InsertBuilder::new("users").values([
        ("name", Value::from("John Doe")),
        ("email", Value::from("john@example.com")),
    ]);
    println!("INSERT SQL: {}", insert.to_sql());

    // UPDATE
    let update = UpdateBuilder::new("users")
        .set([("email", "new@example.com")])
        .where_key("id", 123);
    println!("UPDATE SQL: {}", update.to_sql());

    // DELETE
    let delete = DeleteBuilder::new("users", "id").id(7);
    println!("DELETE SQL: {}", delete.to_sql());

    // Named placeholders rewritten for a positional driver
    let mut statement = Statement::new(update.to_sql());
    statement.bind_all(update.parameters());
    let (sql, values) = statement.to_positional(PlaceholderStyle::Dollar);
    println!("Positional SQL: {} {:?}", sql, values);

    Ok(())
}
