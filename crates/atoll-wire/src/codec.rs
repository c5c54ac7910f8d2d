use atoll_fs::{DirRecord, FileObject, FileRecord, FsEvent, ListEntry, RecursiveSnapshot};

use crate::error::WireError;
use crate::reader::WireReader;
use crate::writer::WireWriter;

/// Codec for the domain shapes crossing the boundary: list entries, entry
/// sequences, recursive snapshots, and events.
///
/// Field order is fixed and position-based; there is no self-description
/// on the wire. Events carry a single leading tag byte.
pub struct WireCodec;

impl WireCodec {
    // -----------------------------------------------------------------
    // ListEntry
    // -----------------------------------------------------------------

    pub fn encode_entry(entry: &ListEntry) -> Vec<u8> {
        let mut w = WireWriter::new();
        Self::put_entry(&mut w, entry);
        w.into_bytes()
    }

    pub fn decode_entry(data: &[u8]) -> Result<ListEntry, WireError> {
        let mut r = WireReader::new(data);
        let entry = Self::get_entry(&mut r)?;
        r.expect_end()?;
        Ok(entry)
    }

    pub fn encode_entries(entries: &[ListEntry]) -> Vec<u8> {
        let mut w = WireWriter::new();
        w.put_seq_len(entries.len());
        for entry in entries {
            Self::put_entry(&mut w, entry);
        }
        w.into_bytes()
    }

    pub fn decode_entries(data: &[u8]) -> Result<Vec<ListEntry>, WireError> {
        let mut r = WireReader::new(data);
        let len = r.get_seq_len()?;
        let mut entries = Vec::with_capacity(len.min(1024));
        for _ in 0..len {
            entries.push(Self::get_entry(&mut r)?);
        }
        r.expect_end()?;
        Ok(entries)
    }

    fn put_entry(w: &mut WireWriter, entry: &ListEntry) {
        w.put_str(&entry.name);
        w.put_bool(entry.is_dir);
        w.put_u64(entry.create_ts);
        w.put_str_seq(&entry.tags);
        w.put_u64(entry.size);
        w.put_str(&entry.blob_id);
        w.put_u64(entry.end_epoch);
    }

    fn get_entry(r: &mut WireReader<'_>) -> Result<ListEntry, WireError> {
        Ok(ListEntry {
            name: r.get_str()?,
            is_dir: r.get_bool()?,
            create_ts: r.get_u64()?,
            tags: r.get_str_seq()?,
            size: r.get_u64()?,
            blob_id: r.get_str()?,
            end_epoch: r.get_u64()?,
        })
    }

    // -----------------------------------------------------------------
    // RecursiveSnapshot
    // -----------------------------------------------------------------

    pub fn encode_snapshot(snapshot: &RecursiveSnapshot) -> Vec<u8> {
        let mut w = WireWriter::new();
        w.put_object_id(&snapshot.dir_id);

        w.put_seq_len(snapshot.files.len());
        for record in &snapshot.files {
            w.put_object_id(&record.id);
            Self::put_file(&mut w, &record.file);
        }

        w.put_seq_len(snapshot.dirs.len());
        for record in &snapshot.dirs {
            w.put_object_id(&record.id);
            w.put_u64(record.create_ts);
            w.put_str_seq(&record.tags);
            w.put_str_seq(&record.children_file_names);
            w.put_object_id_seq(&record.children_file_ids);
            w.put_str_seq(&record.children_directory_names);
            w.put_object_id_seq(&record.children_directory_ids);
        }
        w.into_bytes()
    }

    pub fn decode_snapshot(data: &[u8]) -> Result<RecursiveSnapshot, WireError> {
        let mut r = WireReader::new(data);
        let dir_id = r.get_object_id()?;

        let file_count = r.get_seq_len()?;
        let mut files = Vec::with_capacity(file_count.min(1024));
        for _ in 0..file_count {
            files.push(FileRecord {
                id: r.get_object_id()?,
                file: Self::get_file(&mut r)?,
            });
        }

        let dir_count = r.get_seq_len()?;
        let mut dirs = Vec::with_capacity(dir_count.min(1024));
        for _ in 0..dir_count {
            dirs.push(DirRecord {
                id: r.get_object_id()?,
                create_ts: r.get_u64()?,
                tags: r.get_str_seq()?,
                children_file_names: r.get_str_seq()?,
                children_file_ids: r.get_object_id_seq()?,
                children_directory_names: r.get_str_seq()?,
                children_directory_ids: r.get_object_id_seq()?,
            });
        }
        r.expect_end()?;
        Ok(RecursiveSnapshot {
            dir_id,
            files,
            dirs,
        })
    }

    fn put_file(w: &mut WireWriter, file: &FileObject) {
        w.put_u64(file.create_ts);
        w.put_str_seq(&file.tags);
        w.put_u64(file.size);
        w.put_str(&file.blob_id);
        w.put_u64(file.end_epoch);
    }

    fn get_file(r: &mut WireReader<'_>) -> Result<FileObject, WireError> {
        Ok(FileObject {
            create_ts: r.get_u64()?,
            tags: r.get_str_seq()?,
            size: r.get_u64()?,
            blob_id: r.get_str()?,
            end_epoch: r.get_u64()?,
        })
    }

    // -----------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------

    /// Encode an event as a tag byte followed by its payload fields.
    ///
    /// Tags: 1 FileAdded, 2 FileAlreadyExists, 3 DirAdded,
    /// 4 DirAlreadyExists, 5 Deleted.
    pub fn encode_event(event: &FsEvent) -> Vec<u8> {
        let mut w = WireWriter::new();
        match event {
            FsEvent::FileAdded {
                path,
                create_ts,
                tags,
                size,
                blob_id,
                end_epoch,
            } => {
                w.put_u8(1);
                w.put_str(path);
                w.put_u64(*create_ts);
                w.put_str_seq(tags);
                w.put_u64(*size);
                w.put_str(blob_id);
                w.put_u64(*end_epoch);
            }
            FsEvent::FileAlreadyExists {
                path,
                create_ts,
                tags,
                size,
                blob_id,
                end_epoch,
            } => {
                w.put_u8(2);
                w.put_str(path);
                w.put_u64(*create_ts);
                w.put_str_seq(tags);
                w.put_u64(*size);
                w.put_str(blob_id);
                w.put_u64(*end_epoch);
            }
            FsEvent::DirAdded {
                path,
                create_ts,
                tags,
            } => {
                w.put_u8(3);
                w.put_str(path);
                w.put_u64(*create_ts);
                w.put_str_seq(tags);
            }
            FsEvent::DirAlreadyExists {
                path,
                create_ts,
                tags,
            } => {
                w.put_u8(4);
                w.put_str(path);
                w.put_u64(*create_ts);
                w.put_str_seq(tags);
            }
            FsEvent::Deleted { path } => {
                w.put_u8(5);
                w.put_str(path);
            }
        }
        w.into_bytes()
    }

    pub fn decode_event(data: &[u8]) -> Result<FsEvent, WireError> {
        let mut r = WireReader::new(data);
        let tag = r.get_u8()?;
        let event = match tag {
            1 | 2 => {
                let path = r.get_str()?;
                let create_ts = r.get_u64()?;
                let tags = r.get_str_seq()?;
                let size = r.get_u64()?;
                let blob_id = r.get_str()?;
                let end_epoch = r.get_u64()?;
                if tag == 1 {
                    FsEvent::FileAdded {
                        path,
                        create_ts,
                        tags,
                        size,
                        blob_id,
                        end_epoch,
                    }
                } else {
                    FsEvent::FileAlreadyExists {
                        path,
                        create_ts,
                        tags,
                        size,
                        blob_id,
                        end_epoch,
                    }
                }
            }
            3 | 4 => {
                let path = r.get_str()?;
                let create_ts = r.get_u64()?;
                let tags = r.get_str_seq()?;
                if tag == 3 {
                    FsEvent::DirAdded {
                        path,
                        create_ts,
                        tags,
                    }
                } else {
                    FsEvent::DirAlreadyExists {
                        path,
                        create_ts,
                        tags,
                    }
                }
            }
            5 => FsEvent::Deleted { path: r.get_str()? },
            other => return Err(WireError::UnknownEventTag(other)),
        };
        r.expect_end()?;
        Ok(event)
    }

}
