//! Esquema Diesel (mantenido a mano). Reemplazable con `diesel print-schema`.

diesel::table! {
    questions (id) {
        id -> Uuid,
        status -> Text,
        flag_status -> Text,
        is_variant -> Bool,
        original_question_id -> Nullable<Uuid>,
        variant_number -> Nullable<Int4>,
        created_by -> Uuid,
        payload -> Jsonb,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    history_log (seq) {
        seq -> BigInt,
        question_id -> Uuid,
        role -> Text,
        action -> Text,
        actor_id -> Uuid,
        ts -> Timestamptz,
        note -> Nullable<Text>,
    }
}

diesel::table! {
    users (id) {
        id -> Uuid,
        role -> Text,
        admin_role -> Nullable<Text>,
        active -> Bool,
    }
}

diesel::joinable!(history_log -> questions (question_id));

diesel::allow_tables_to_appear_in_same_query!(questions, history_log, users,);
