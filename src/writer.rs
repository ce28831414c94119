//! # 原子写入
//!
//! 先在目标文件所在目录写临时文件，刷盘后 rename 覆盖目标。
//! 目标文件要么是旧的完整内容，要么是新的完整内容，不会出现写了一半的文件。

use std::fs::{self, Permissions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::ConvertError;

/// 原子写入文本行，每行以 `\n` 结尾，返回写入的字节数
pub fn write_atomic<'a, I>(path: &Path, lines: I) -> Result<u64, ConvertError>
where
    I: IntoIterator<Item = &'a str>,
{
    write_atomic_with(path, |w| {
        for line in lines {
            w.write_all(line.as_bytes())?;
            w.write_all(b"\n")?;
        }
        Ok(())
    })
}

/// 通用的原子写入：内容由闭包写出，闭包失败时目标文件保持不变
fn write_atomic_with<F>(path: &Path, write: F) -> Result<u64, ConvertError>
where
    F: FnOnce(&mut dyn Write) -> io::Result<()>,
{
    let to_err = |source: io::Error| ConvertError::Write {
        path: path.to_path_buf(),
        source,
    };

    // 临时文件必须和目标在同一目录（同一文件系统），rename 才是原子的
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::Builder::new()
        .prefix(".qx2adguard-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(to_err)?;

    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        write(&mut writer).map_err(to_err)?;
        writer.flush().map_err(to_err)?;
    }
    tmp.as_file().sync_all().map_err(to_err)?;

    let size = tmp.as_file().metadata().map_err(to_err)?.len();
    let perms = output_permissions(path, &tmp).map_err(to_err)?;
    fs::set_permissions(tmp.path(), perms).map_err(to_err)?;

    // 失败时 NamedTempFile 在 drop 时自动删除临时文件
    persist(tmp, path).map_err(to_err)?;

    Ok(size)
}

fn persist(tmp: NamedTempFile, path: &Path) -> io::Result<()> {
    tmp.persist(path).map(|_| ()).map_err(|e| e.error)
}

/// 沿用旧文件的权限；新文件在 unix 上使用 0644（临时文件默认是 0600）
fn output_permissions(path: &Path, tmp: &NamedTempFile) -> io::Result<Permissions> {
    if let Ok(meta) = fs::metadata(path) {
        return Ok(meta.permissions());
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let _ = tmp;
        Ok(Permissions::from_mode(0o644))
    }

    #[cfg(not(unix))]
    {
        Ok(tmp.as_file().metadata()?.permissions())
    }
}
