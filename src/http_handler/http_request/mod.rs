pub(crate) mod lvar_set_post;
pub(crate) mod lvar_step_post;
pub(crate) mod lvars_get;
pub(crate) mod profile_get;
pub(crate) mod request_common;
pub(crate) mod update_sim_post;
