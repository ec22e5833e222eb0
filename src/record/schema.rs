//! Job descriptor schema
//!
//! One declarative table drives everything: the `job_record_schema!`
//! invocation at the bottom of this file expands to the `JobRecord` struct
//! and to `FIELDS`, the descriptor table the transcoder walks. Adding a
//! field means adding one line.

use serde::{Deserialize, Serialize};

use crate::marshal::sentinel::{Width, NO_VAL, NO_VAL16, NO_VAL64, NO_VAL8};

/// Field kind, determines the marshaller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Optional text
    Text,
    /// Unsigned integer with an unset sentinel
    Uint(Width),
    /// Integer flag presented as a boolean
    Flag(Width),
    /// Timestamp, always present
    Time,
    /// Text array
    List,
    /// `key=value` text array
    Env,
}

impl FieldKind {
    /// Short name for listings
    pub fn describe(self) -> String {
        match self {
            FieldKind::Text => "text".to_string(),
            FieldKind::Uint(w) => w.to_string(),
            FieldKind::Flag(w) => format!("bool({})", w),
            FieldKind::Time => "time".to_string(),
            FieldKind::List => "list".to_string(),
            FieldKind::Env => "env".to_string(),
        }
    }
}

/// Read-only view of one field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRef<'a> {
    Text(Option<&'a str>),
    Uint(Width, u64),
    Flag(Width, u64),
    Time(i64),
    List(&'a [String]),
    Env(&'a [String]),
}

/// Mutable reference to an integer field of some width
#[derive(Debug)]
pub enum UintMut<'a> {
    U8(&'a mut u8),
    U16(&'a mut u16),
    U32(&'a mut u32),
    U64(&'a mut u64),
}

impl UintMut<'_> {
    pub fn width(&self) -> Width {
        match self {
            UintMut::U8(_) => Width::W8,
            UintMut::U16(_) => Width::W16,
            UintMut::U32(_) => Width::W32,
            UintMut::U64(_) => Width::W64,
        }
    }

    /// Store `raw`, truncated to the field's width
    pub fn store(
        &mut self,
        raw: u64,
    ) {
        match self {
            UintMut::U8(v) => **v = raw as u8,
            UintMut::U16(v) => **v = raw as u16,
            UintMut::U32(v) => **v = raw as u32,
            UintMut::U64(v) => **v = raw,
        }
    }
}

/// Mutable view of one field
#[derive(Debug)]
pub enum FieldMut<'a> {
    Text(&'a mut Option<String>),
    Uint(UintMut<'a>),
    Flag(UintMut<'a>),
    Time(&'a mut i64),
    List(&'a mut Vec<String>),
    Env(&'a mut Vec<String>),
}

/// One schema entry
pub struct FieldDescriptor {
    /// Field name, also the key in the dynamic record
    pub name: &'static str,
    pub kind: FieldKind,
    pub read: for<'a> fn(&'a JobRecord) -> FieldRef<'a>,
    pub write: for<'a> fn(&'a mut JobRecord) -> FieldMut<'a>,
}

impl std::fmt::Debug for FieldDescriptor {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish()
    }
}

/// Look up a descriptor by field name
pub fn descriptor(name: &str) -> Option<&'static FieldDescriptor> {
    FIELDS.iter().find(|d| d.name == name)
}

// ============================================================================
// Per-kind expansion helpers
// ============================================================================

macro_rules! field_type {
    (text) => { Option<String> };
    (u8) => { u8 };
    (u16) => { u16 };
    (u32) => { u32 };
    (u64) => { u64 };
    (flag8) => { u8 };
    (flag16) => { u16 };
    (time) => { i64 };
    (list) => { Vec<String> };
    (env) => { Vec<String> };
}

macro_rules! field_default {
    (text) => { None };
    (u8) => { NO_VAL8 };
    (u16) => { NO_VAL16 };
    (u32) => { NO_VAL };
    (u64) => { NO_VAL64 };
    (flag8) => { NO_VAL8 };
    (flag16) => { NO_VAL16 };
    (time) => { 0 };
    (list) => { Vec::new() };
    (env) => { Vec::new() };
}

macro_rules! field_kind {
    (text) => { FieldKind::Text };
    (u8) => { FieldKind::Uint(Width::W8) };
    (u16) => { FieldKind::Uint(Width::W16) };
    (u32) => { FieldKind::Uint(Width::W32) };
    (u64) => { FieldKind::Uint(Width::W64) };
    (flag8) => { FieldKind::Flag(Width::W8) };
    (flag16) => { FieldKind::Flag(Width::W16) };
    (time) => { FieldKind::Time };
    (list) => { FieldKind::List };
    (env) => { FieldKind::Env };
}

macro_rules! field_ref {
    (text, $f:expr) => { FieldRef::Text($f.as_deref()) };
    (u8, $f:expr) => { FieldRef::Uint(Width::W8, $f as u64) };
    (u16, $f:expr) => { FieldRef::Uint(Width::W16, $f as u64) };
    (u32, $f:expr) => { FieldRef::Uint(Width::W32, $f as u64) };
    (u64, $f:expr) => { FieldRef::Uint(Width::W64, $f) };
    (flag8, $f:expr) => { FieldRef::Flag(Width::W8, $f as u64) };
    (flag16, $f:expr) => { FieldRef::Flag(Width::W16, $f as u64) };
    (time, $f:expr) => { FieldRef::Time($f) };
    (list, $f:expr) => { FieldRef::List(&$f) };
    (env, $f:expr) => { FieldRef::Env(&$f) };
}

macro_rules! field_mut {
    (text, $f:expr) => { FieldMut::Text(&mut $f) };
    (u8, $f:expr) => { FieldMut::Uint(UintMut::U8(&mut $f)) };
    (u16, $f:expr) => { FieldMut::Uint(UintMut::U16(&mut $f)) };
    (u32, $f:expr) => { FieldMut::Uint(UintMut::U32(&mut $f)) };
    (u64, $f:expr) => { FieldMut::Uint(UintMut::U64(&mut $f)) };
    (flag8, $f:expr) => { FieldMut::Flag(UintMut::U8(&mut $f)) };
    (flag16, $f:expr) => { FieldMut::Flag(UintMut::U16(&mut $f)) };
    (time, $f:expr) => { FieldMut::Time(&mut $f) };
    (list, $f:expr) => { FieldMut::List(&mut $f) };
    (env, $f:expr) => { FieldMut::Env(&mut $f) };
}

macro_rules! job_record_schema {
    ($( $kind:ident $name:ident; )*) => {
        /// Job descriptor handed to the submit hook
        ///
        /// Integer fields default to their width's unset pattern, text to
        /// absent, arrays to empty and timestamps to zero.
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(default)]
        pub struct JobRecord {
            $( pub $name: field_type!($kind), )*
        }

        impl Default for JobRecord {
            fn default() -> Self {
                Self {
                    $( $name: field_default!($kind), )*
                }
            }
        }

        /// Schema table, in the order fields are presented to the script
        pub static FIELDS: &[FieldDescriptor] = &[
            $(
                FieldDescriptor {
                    name: stringify!($name),
                    kind: field_kind!($kind),
                    read: |record| field_ref!($kind, record.$name),
                    write: |record| field_mut!($kind, record.$name),
                },
            )*
        ];
    };
}

job_record_schema! {
    text account;
    text acctg_freq;
    text admin_comment;
    text alloc_node;
    u16 alloc_resp_port;
    u32 alloc_sid;
    list argv;
    text array_inx;
    time begin_time;
    u32 bitflags;
    text burst_buffer;
    text clusters;
    text comment;
    flag16 contiguous;
    u16 core_spec;
    text cpu_bind;
    u16 cpu_bind_type;
    u32 cpu_freq_min;
    u32 cpu_freq_max;
    u32 cpu_freq_gov;
    time deadline;
    u32 delay_boot;
    text dependency;
    time end_time;
    env environment;
    text exc_nodes;
    text features;
    u32 group_id;
    flag16 immediate;
    u32 job_id;
    text job_id_str;
    flag16 kill_on_node_fail;
    text licenses;
    u16 mail_type;
    text mail_user;
    text mcs_label;
    text mem_bind;
    u16 mem_bind_type;
    text name;
    text network;
    u32 nice;
    u32 num_tasks;
    u8 open_mode;
    u16 other_port;
    flag8 overcommit;
    text partition;
    u16 plane_size;
    u8 power_flags;
    u32 priority;
    u32 profile;
    text qos;
    flag16 reboot;
    text resp_host;
    u16 restart_cnt;
    text req_nodes;
    flag16 requeue;
    text reservation;
    text script;
    u16 shared;
    list spank_job_env;
    u32 task_dist;
    u32 time_limit;
    u32 time_min;
    u32 user_id;
    flag16 wait_all_nodes;
    u16 warn_flags;
    u16 warn_signal;
    u16 warn_time;
    text work_dir;
    u16 cpus_per_task;
    u32 min_cpus;
    u32 max_cpus;
    u32 min_nodes;
    u32 max_nodes;
    u16 boards_per_node;
    u16 sockets_per_board;
    u16 sockets_per_node;
    u16 cores_per_socket;
    u16 threads_per_core;
    u16 ntasks_per_node;
    u16 ntasks_per_socket;
    u16 ntasks_per_core;
    u16 ntasks_per_board;
    u16 pn_min_cpus;
    u64 pn_min_memory;
    u32 pn_min_tmp_disk;
    u32 req_switch;
    text std_err;
    text std_in;
    text std_out;
    u32 wait4switch;
    text wckey;
    text cluster_features;
    text extra;
    u64 fed_siblings_active;
    u64 fed_siblings_viable;
    text origin_cluster;
    u16 x11;
    text x11_magic_cookie;
    u16 x11_target_port;
    text batch_features;
    text cpus_per_tres;
    text mem_per_tres;
    text tres_bind;
    text tres_freq;
    text tres_per_job;
    text tres_per_node;
    text tres_per_socket;
    text tres_per_task;
    u32 site_factor;
    text x11_target;
    text submit_line;
}

// Paired counts are derived from the arrays so they cannot drift.
impl JobRecord {
    pub fn argc(&self) -> u32 {
        self.argv.len() as u32
    }

    pub fn env_size(&self) -> u32 {
        self.environment.len() as u32
    }

    pub fn spank_job_env_size(&self) -> u32 {
        self.spank_job_env.len() as u32
    }
}
