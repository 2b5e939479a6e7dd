//! Deployment layouts.
//!
//! `psql` writes one `install.sql` per role. `ansible` writes an ansible role
//! per pgbuild role: `files/install.sql` plus `tasks/main.yml`.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::PgBuildResult;
use crate::role::Role;

/// Directory layout of a build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    Psql,
    #[default]
    Ansible,
}

const BASIC_ROLE_TASKS: &str = r#"
- name: create .pgbuild/run directory
  file: path=/tmp/.pgbuild/run state=directory

- name: transfer install.sql
  copy: src=install.sql dest=/tmp/.pgbuild/run/install.sql

- name: deploy install.sql
  command: psql -f /tmp/.pgbuild/run/install.sql -d {{cluster_name}} -p {{port}} --set=ON_ERROR_STOP=1
  sudo: yes
  sudo_user: postgres

{jobs}

- name: delete .pgbuild/run directory
  file: path=/tmp/.pgbuild state=absent
"#;

const SHARD_ROLE_TASKS: &str = r#"
- name: create .pgbuild/run directory
  file: path=/tmp/.pgbuild/run state=directory

- name: transfer install.sql
  copy: src=install.sql dest=/tmp/.pgbuild/run/install.sql

- name: run install.sql
  command: psql -f /tmp/.pgbuild/run/install.sql -d {{cluster_name}}{{'_%02d'|format(item)}} -p {{port}} --set=ON_ERROR_STOP=1
  with_items: hostvars[inventory_hostname].shards
  sudo: yes
  sudo_user: postgres

{jobs}

- name: delete .pgbuild/run directory
  file: path=/tmp/.pgbuild state=absent
"#;

fn cron_task(job: &str, shards: bool) -> String {
    if shards {
        format!(
            "\n- cron: {}\n  with_items: hostvars[inventory_hostname].shards\n  sudo: yes\n  sudo_user: postgres\n",
            job
        )
    } else {
        format!("\n- cron: {}\n  sudo: yes\n  sudo_user: postgres\n", job)
    }
}

/// Ansible task list for a role, jobs included.
pub fn ansible_tasks(role: &Role) -> String {
    let shards = role.is_shard();
    let template = if shards { SHARD_ROLE_TASKS } else { BASIC_ROLE_TASKS };
    let jobs: Vec<String> = role.jobs().into_iter().map(|j| cron_task(j, shards)).collect();
    template.replace("{jobs}", &jobs.join("\n\n"))
}

fn psql_build(role: &Role, dest: &Path) -> PgBuildResult<()> {
    let dir = dest.join(&role.name);
    fs::create_dir_all(&dir)?;
    fs::write(dir.join("install.sql"), role.build()?)?;
    Ok(())
}

fn ansible_build(role: &Role, dest: &Path) -> PgBuildResult<()> {
    let dir = dest.join(&role.name);
    fs::create_dir_all(dir.join("files"))?;
    fs::create_dir_all(dir.join("tasks"))?;
    fs::write(dir.join("files").join("install.sql"), role.build()?)?;
    fs::write(dir.join("tasks").join("main.yml"), ansible_tasks(role))?;
    Ok(())
}

/// Write every role under `dest` in the given layout.
pub fn build_roles(roles: &[Role], dest: impl AsRef<Path>, layout: Layout) -> PgBuildResult<()> {
    let dest = dest.as_ref();

    for role in roles {
        tracing::info!("Building role {} ({:?}) into {}", role.name, layout, dest.display());
        match layout {
            Layout::Psql => psql_build(role, dest)?,
            Layout::Ansible => ansible_build(role, dest)?,
        }
    }

    Ok(())
}
