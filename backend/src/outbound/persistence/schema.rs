//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the deployed schema exactly; Diesel uses
//! them for compile-time query validation and type-safe SQL generation.

diesel::table! {
    /// Resident accounts, keyed by UUID, unique per external identity.
    users (id) {
        id -> Uuid,
        external_id -> Varchar,
        first_name -> Varchar,
        last_name -> Nullable<Varchar>,
        username -> Nullable<Varchar>,
        apartment -> Nullable<Varchar>,
        building -> Nullable<Varchar>,
        street -> Nullable<Varchar>,
        phone -> Nullable<Varchar>,
        email -> Nullable<Varchar>,
        is_admin -> Bool,
        is_active -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only reading chain per (user, meter kind).
    meter_readings (id) {
        id -> Uuid,
        user_id -> Uuid,
        meter_kind -> Varchar,
        value -> Float8,
        previous_value -> Nullable<Float8>,
        consumption -> Nullable<Float8>,
        notes -> Nullable<Text>,
        photo -> Nullable<Varchar>,
        is_verified -> Bool,
        verified_by -> Nullable<Varchar>,
        verified_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Resident trouble tickets.
    complaints (id) {
        id -> Uuid,
        user_id -> Uuid,
        title -> Varchar,
        description -> Text,
        category -> Varchar,
        priority -> Varchar,
        status -> Varchar,
        assigned_to -> Nullable<Varchar>,
        response -> Nullable<Text>,
        resolution_notes -> Nullable<Text>,
        estimated_completion -> Nullable<Timestamptz>,
        actual_completion -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// One notification row per targeted recipient.
    notifications (id) {
        id -> Uuid,
        recipient -> Uuid,
        title -> Varchar,
        message -> Text,
        severity -> Varchar,
        sent_at -> Timestamptz,
        read_by -> Array<Uuid>,
    }
}

diesel::table! {
    /// Meter kind catalog, keyed by stable code.
    meter_types (code) {
        code -> Varchar,
        name -> Varchar,
        unit -> Varchar,
        description -> Nullable<Text>,
        is_active -> Bool,
    }
}

diesel::table! {
    /// Complaint category catalog with SLA targets, keyed by stable code.
    complaint_categories (code) {
        code -> Varchar,
        name -> Varchar,
        description -> Nullable<Text>,
        sla_hours -> Int4,
        is_active -> Bool,
    }
}

diesel::joinable!(meter_readings -> users (user_id));
diesel::joinable!(complaints -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(users, meter_readings, complaints, notifications);
